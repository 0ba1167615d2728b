//! # MemLib
//!
//! Memlib is a library for simulating a two-level virtual-memory and cache
//! hierarchy over a trace of memory accesses
//!
//! One generic set-associative store provides geometry and LRU replacement
//! for both the hardware cache and the TLB, and the same recency bookkeeping
//! backs the page-frame allocator, so every structure produces bit-exact
//! hit/miss sequences from a single engine
//!
//! The simulator itself is an owned context driven one trace event at a
//! time; there is no global state and no concurrency

/// Contains the hardware cache built on the associative store
pub mod cache;

/// Contains definitions for the JSON configuration format and its validation
pub mod config;

/// Contains the error taxonomy for configuration and trace input
pub mod error;

/// Contains the trace-file readers
pub mod io;

/// Contains the multi-level cache composer
pub mod multilevel;

/// Contains the linear page table and physical-frame allocator
pub mod pagetable;

/// Contains the recency list behind all LRU bookkeeping
pub mod recency;

/// Contains the simulator that drives the TLB, page table, and caches
pub mod simulator;

/// Contains the generic set-associative store and its geometry
pub mod store;

/// Contains the TLB built on the associative store
pub mod tlb;

/// Contains the trace-line parser
pub mod trace;

#[cfg(test)]
mod test;
