//! foresight-classifiers: pluggable binary-classifier trainers.
//!
//! This crate provides the trainer abstraction consumed by the
//! `foresight-train` launcher: a shared `BinaryTrainer` trait, from-scratch
//! logistic-regression and neural-network implementations (with optional
//! TensorFlow-backed variants behind a feature flag), dataset loading and
//! preprocessing utilities, evaluation statistics, and per-run HTML reports.
//!
//! The design favors small, testable modules with feature flags to avoid
//! requiring native dependencies (e.g., libtensorflow) unless explicitly
//! enabled.
pub mod config;
pub mod dataset;
pub mod envelope;
pub mod error;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod run;
pub mod stats;
