//! Proptest generators for property-based testing.

use proptest::prelude::*;

use docreg_core::{Call, Identity, Keypair};

/// Size of the party pool random operations draw from. Party 0 is the
/// administrator.
pub const PARTIES: usize = 4;

/// Size of the document pool. Document 0 has the empty hash.
pub const DOCUMENTS: usize = 5;

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    keypair().prop_map(|kp| kp.identity())
}

/// Generate a non-empty hash string: hex-looking or arbitrary text.
pub fn hash_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "0x[0-9a-f]{1,64}".prop_map(String::from),
        "Qm[1-9A-HJ-NP-Za-km-z]{44}".prop_map(String::from),
        ".{1,40}".prop_map(String::from),
    ]
}

/// Generate a free-text title, possibly empty.
pub fn title() -> impl Strategy<Value = String> {
    "[ -~]{0,24}".prop_map(String::from)
}

/// Generate a rejection reason, empty about a third of the time.
pub fn reason() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z ]{1,16}".prop_map(String::from)]
}

/// The hash string of pool document `doc`.
pub fn document_hash(doc: usize) -> String {
    if doc == 0 {
        String::new()
    } else {
        format!("0x{:04x}", doc)
    }
}

/// One registry operation over the party and document pools.
#[derive(Debug, Clone)]
pub enum Op {
    Register { actor: usize, doc: usize, title: String },
    Request { actor: usize, doc: usize },
    Verify {
        actor: usize,
        doc: usize,
        approve: bool,
        reason: String,
    },
    AddVerifier { actor: usize, target: usize },
    RemoveVerifier { actor: usize, target: usize },
}

impl Op {
    /// Resolve pool indices against `parties` into a caller and a call.
    ///
    /// `parties` must not be empty.
    pub fn to_call(&self, parties: &[Identity]) -> (Identity, Call) {
        let party = |i: usize| parties[i % parties.len()];
        match self {
            Op::Register { actor, doc, title } => (
                party(*actor),
                Call::RegisterDocument {
                    hash: document_hash(*doc),
                    title: title.clone(),
                },
            ),
            Op::Request { actor, doc } => (
                party(*actor),
                Call::RequestVerification {
                    hash: document_hash(*doc),
                },
            ),
            Op::Verify {
                actor,
                doc,
                approve,
                reason,
            } => (
                party(*actor),
                Call::VerifyDocument {
                    hash: document_hash(*doc),
                    approve: *approve,
                    reason: reason.clone(),
                },
            ),
            Op::AddVerifier { actor, target } => (
                party(*actor),
                Call::AddVerifier {
                    identity: party(*target),
                },
            ),
            Op::RemoveVerifier { actor, target } => (
                party(*actor),
                Call::RemoveVerifier {
                    identity: party(*target),
                },
            ),
        }
    }
}

impl Arbitrary for Op {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        let actor = 0..PARTIES;
        let doc = 0..DOCUMENTS;
        prop_oneof![
            3 => (actor.clone(), doc.clone(), title())
                .prop_map(|(actor, doc, title)| Op::Register { actor, doc, title }),
            1 => (actor.clone(), doc.clone())
                .prop_map(|(actor, doc)| Op::Request { actor, doc }),
            3 => (actor.clone(), doc, any::<bool>(), reason())
                .prop_map(|(actor, doc, approve, reason)| Op::Verify {
                    actor,
                    doc,
                    approve,
                    reason,
                }),
            2 => (actor.clone(), actor.clone())
                .prop_map(|(actor, target)| Op::AddVerifier { actor, target }),
            2 => (actor.clone(), actor)
                .prop_map(|(actor, target)| Op::RemoveVerifier { actor, target }),
        ]
        .boxed()
    }
}

/// A random sequence of operations.
#[derive(Debug, Clone)]
pub struct OpSequence {
    pub ops: Vec<Op>,
}

impl Arbitrary for OpSequence {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop::collection::vec(any::<Op>(), 0..48)
            .prop_map(|ops| OpSequence { ops })
            .boxed()
    }
}
