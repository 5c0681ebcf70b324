//! # Docket Core
//!
//! Platform-independent library for partition-aware hybrid retrieval over
//! enterprise agreement documents.
//!
//! This crate provides the retrieval index and the question-answering
//! pipeline used by the Docket tools. Text extraction and model inference
//! stay outside: pages arrive as records, embeddings come from an injected
//! provider, and answers come from an injected completion model.
//!
//! ## Modules
//!
//! - [`search`] - Hybrid retrieval (HNSW vector + BM25 keyword + weighted score fusion)
//! - [`embedding`] - Embedding provider trait and the built-in hashing provider
//! - [`corpus`] - Page-to-chunk preparation and the document partition map
//! - [`agent`] - Routing, answering, and conversation summarization pipeline
//! - [`config`] - Production configuration constants
//! - [`error`] - Error types for retrieval, embedding, and agent operations

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod agent;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod search;
