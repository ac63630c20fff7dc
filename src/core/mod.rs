// src/core/mod.rs — The relay: question generation, answering, logging

pub mod answer;
pub mod question;
pub mod relay;
pub mod transcript;
