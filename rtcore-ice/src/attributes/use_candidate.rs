use shared::error::Result;
use stun::attributes::ATTR_USE_CANDIDATE;
use stun::message::{Getter, Message, Setter};

/// USE-CANDIDATE attribute (RFC8445 section 7.1.4): a zero-length flag
/// attribute the controlling agent sets on the Binding request that
/// nominates a candidate pair.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct UseCandidateAttr;

impl UseCandidateAttr {
    pub fn new() -> Self {
        UseCandidateAttr
    }
}

impl Setter for UseCandidateAttr {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(ATTR_USE_CANDIDATE, &[]);
        Ok(())
    }
}

impl Getter for UseCandidateAttr {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        m.get(ATTR_USE_CANDIDATE)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use stun::message::BINDING_REQUEST;

    #[test]
    fn use_candidate_round_trips() {
        let mut m = Message::new();
        m.typ = BINDING_REQUEST;
        UseCandidateAttr::new().add_to(&mut m).unwrap();
        m.write_header();

        let mut decoded = Message::new();
        decoded.unmarshal_binary(&m.raw).unwrap();
        assert!(decoded.contains(ATTR_USE_CANDIDATE));
    }
}
