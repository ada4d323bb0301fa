//! Provider module for fraudsight
//!
//! This module contains the reasoning-engine abstraction and the hosted
//! Gemini implementation.

pub mod base;
pub mod gemini;

pub use base::{
    validate_message_sequence, CompletionResponse, FunctionCall, Message, Provider, TokenUsage,
    ToolCall,
};
pub use gemini::GeminiProvider;
