//! # docqa
//!
//! A document question-answering pipeline over local SQLite storage.
//!
//! PDFs are partitioned into blocks, chunked by title with hard size caps,
//! embedded per chunk (fail-soft), and stored. Questions are answered by
//! retrieving a scope's stored content, assembling a fixed prompt, and
//! calling a generation model; each generated answer is cached so the exact
//! same question never reaches the model twice.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌──────────┐
//! │   PDF    │──▶│ Partition +   │──▶│  SQLite   │
//! │  upload  │   │ Chunk + Embed │   │ messages  │
//! └──────────┘   └───────────────┘   └────┬─────┘
//!                                         │
//!                     ┌───────────────────┤
//!                     ▼                   ▼
//!                ┌──────────┐       ┌──────────┐
//!                │   CLI    │       │   HTTP   │
//!                │ (docqa)  │       │  (JSON)  │
//!                └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docqa init                          # create database
//! docqa ingest report.pdf --scope s1  # partition, chunk, embed, store
//! docqa ask "What is covered?" --scope s1
//! docqa serve                         # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | PDF text extraction and block partitioning |
//! | [`chunk`] | By-title chunking with size caps |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`generation`] | Text generation provider abstraction |
//! | [`store`] | Content store over SQLite |
//! | [`cache`] | Exact-match answer cache |
//! | [`prompt`] | Prompt assembly |
//! | [`ingest`] | Document ingestion pipeline |
//! | [`ask`] | Query answering pipeline |
//! | [`server`] | JSON HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`error`] | Crate-wide error type |

pub mod ask;
pub mod cache;
pub mod chunk;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod generation;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod prompt;
pub mod server;
pub mod store;
