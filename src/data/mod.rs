//! Data layer: records, loading, linking, filtering and export.
//!
//! Architecture:
//! ```text
//!  neos.csv        cad.json
//!      │               │
//!      ▼               ▼
//!   ┌──────────────────────┐
//!   │        loader        │  parse files → unlinked records
//!   └──────────────────────┘
//!              │
//!              ▼
//!   ┌──────────────────────┐
//!   │     NeoDatabase      │  index by designation / name, link approaches
//!   └──────────────────────┘
//!              │
//!              ▼
//!   ┌──────────────────────┐
//!   │   filter + limit     │  AND of attribute predicates, lazy truncation
//!   └──────────────────────┘
//!              │
//!              ▼
//!   ┌──────────────────────┐
//!   │        writer        │  CSV / JSON export
//!   └──────────────────────┘
//! ```

pub mod database;
pub mod filter;
pub mod loader;
pub mod model;
pub mod sample;
pub mod writer;
