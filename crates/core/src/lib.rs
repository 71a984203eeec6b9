//! # Seeker Core
//!
//! The "Brain" of the Seeker system - contains the planning, agent
//! orchestration, and knowledge accumulation logic.
//!
//! ## Architecture
//!
//! - `planner/` - LLM planning collaborators (Gemini, Anthropic) that turn a query into a `Plan`
//! - `completion/` - streaming chat-completion providers (OpenRouter, Moonshot)
//! - `search/` - web search providers (Brave, ZenSERP) and page fetching
//! - `session/` - the session state machine: orchestrator, agent runner, event types
//! - `knowledge` - append-only per-session knowledge store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use seeker_core::config::AppConfig;
//! use seeker_core::session::Orchestrator;
//!
//! let config = Arc::new(AppConfig::from_env());
//! let orchestrator = Orchestrator::from_config(config, reqwest::Client::new());
//! let mut events = orchestrator.run("Find information about Alan Turing".to_string());
//! ```

pub mod completion;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod plan;
pub mod planner;
pub mod search;
pub mod session;
