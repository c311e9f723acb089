//! OSC message
//!
//! A message is an address pattern plus an ordered list of arguments. It is
//! meant to be reused as a scratch buffer: call [`Message::init`] before
//! filling it for a new send.

use super::value::Value;

/// An OSC message under construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    address: String,
    args: Vec<Value>,
}

impl Message {
    /// Create a message for the given address pattern
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            args: Vec::new(),
        }
    }

    /// Reset the message for reuse with a new address
    ///
    /// Keeps the argument allocation around.
    pub fn init(&mut self, address: &str) -> &mut Self {
        self.address.clear();
        self.address.push_str(address);
        self.args.clear();
        self
    }

    /// Append one argument
    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.args.push(value.into());
        self
    }

    /// Builder-style variant of [`Message::push`]
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.push(value);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Type tag string including the leading comma, e.g. `",ifs"`
    pub fn type_tags(&self) -> String {
        let mut tags = String::with_capacity(self.args.len() + 1);
        tags.push(',');
        tags.extend(self.args.iter().map(|v| v.tag() as char));
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut msg = Message::new("/synth/freq");
        msg.push(440).push(0.5f32).push("sine");

        assert_eq!(msg.address(), "/synth/freq");
        assert_eq!(msg.len(), 3);
        assert_eq!(msg.type_tags(), ",ifs");
        assert_eq!(msg.args()[0], Value::Int(440));
        assert_eq!(msg.args()[2].as_str(), Some("sine"));
    }

    #[test]
    fn test_init_resets() {
        let mut msg = Message::new("/a").with(1).with(true);
        msg.init("/b");

        assert_eq!(msg.address(), "/b");
        assert!(msg.is_empty());
        assert_eq!(msg.type_tags(), ",");
    }

    #[test]
    fn test_bool_tags() {
        let msg = Message::new("/flags").with(true).with(false);
        assert_eq!(msg.type_tags(), ",TF");
    }
}
