//! Bounded chat memory.
//!
//! Keeps the most recent messages whose estimated token count fits the
//! limit. The window never starts on an assistant or tool message, so a
//! tool result is never sent without the call that produced it.

use holocron_core::types::{Message, Role};

/// Per-message overhead for role and framing, in tokens.
const MESSAGE_OVERHEAD_TOKENS: usize = 4;

/// Rough token estimate for one message (4 chars ≈ 1 token).
pub fn estimate_message_tokens(message: &Message) -> usize {
    let mut chars = message.content.chars().count();
    if let Some(calls) = &message.tool_calls {
        chars += calls
            .iter()
            .map(|c| c.function.name.len() + c.function.arguments.chars().count())
            .sum::<usize>();
    }
    chars.div_ceil(4) + MESSAGE_OVERHEAD_TOKENS
}

#[derive(Debug, Clone)]
pub struct ChatMemoryBuffer {
    token_limit: usize,
    messages: Vec<Message>,
}

impl ChatMemoryBuffer {
    pub fn new(token_limit: usize) -> Self {
        Self {
            token_limit,
            messages: Vec::new(),
        }
    }

    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    /// Append messages, then drop whatever fell out of the window.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
        let start = self.window_start();
        if start > 0 {
            self.messages.drain(..start);
        }
    }

    /// The messages that fit the token limit, oldest first.
    pub fn get(&self) -> &[Message] {
        &self.messages[self.window_start()..]
    }

    pub fn estimated_tokens(&self) -> usize {
        self.get().iter().map(estimate_message_tokens).sum()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn window_start(&self) -> usize {
        let mut used = 0;
        let mut start = self.messages.len();
        for (i, message) in self.messages.iter().enumerate().rev() {
            used += estimate_message_tokens(message);
            if used > self.token_limit {
                break;
            }
            start = i;
        }
        while start < self.messages.len()
            && matches!(self.messages[start].role, Role::Assistant | Role::Tool)
        {
            start += 1;
        }
        start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holocron_core::types::{FunctionCall, ToolCall};

    fn call() -> ToolCall {
        ToolCall {
            id: "c1".into(),
            r#type: "function".into(),
            function: FunctionCall {
                name: "search_documents".into(),
                arguments: r#"{"query":"Palpatine"}"#.into(),
            },
        }
    }

    #[test]
    fn test_keeps_everything_under_limit() {
        let mut memory = ChatMemoryBuffer::new(3072);
        memory.extend([Message::user("Who was Palpatine?")]);
        memory.extend([Message::assistant("The Emperor.")]);
        assert_eq!(memory.get().len(), 2);
        assert!(memory.estimated_tokens() > 0);
    }

    #[test]
    fn test_drops_oldest_over_limit() {
        let mut memory = ChatMemoryBuffer::new(40);
        for i in 0..10 {
            memory.extend([Message::user(format!("question number {i} about the Sith"))]);
            memory.extend([Message::assistant(format!("answer number {i}"))]);
        }
        let window = memory.get();
        assert!(window.len() < 20);
        assert_eq!(window[0].role, Role::User);
        assert_eq!(window.last().unwrap().content, "answer number 9");
        assert!(memory.estimated_tokens() <= 40);
    }

    #[test]
    fn test_never_starts_with_tool_result() {
        // Budget fits only the tool result and the final answer.
        let tool_result = Message::tool("x".repeat(40), "c1");
        let answer = Message::assistant("y".repeat(40));
        let limit = estimate_message_tokens(&tool_result) + estimate_message_tokens(&answer);

        let mut memory = ChatMemoryBuffer::new(limit);
        memory.extend([
            Message::user("z".repeat(40)),
            Message::assistant_tool_calls("", vec![call()]),
            tool_result,
            answer,
        ]);
        assert!(memory.get().is_empty());
    }

    #[test]
    fn test_oversized_message_yields_empty_window() {
        let mut memory = ChatMemoryBuffer::new(10);
        memory.extend([Message::user("a".repeat(400))]);
        assert!(memory.get().is_empty());
        assert!(memory.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut memory = ChatMemoryBuffer::new(100);
        memory.extend([Message::user("hi")]);
        memory.clear();
        assert!(memory.is_empty());
    }
}
