//! # RustKit Bench
//!
//! Performance benchmarking for the RustKit geometry core.
//!
//! ## Features
//!
//! - Overflow computation over flat and deep box trees
//! - Scroll container updates in every writing mode
//! - Background tile geometry
//! - Fixture builders shared with the criterion benches
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rustkit_bench::{Benchmark, BenchmarkResult};
//!
//! let bench = Benchmark::new();
//! let results = bench.run_all()?;
//! results.print_summary();
//! ```

use std::time::{Duration, Instant};

use rustkit_css::ComputedStyle;
use rustkit_layout::{
    BoxId, ImageSizingInfo, LayoutContext, LayoutError, LayoutTree, NodeKind, PhysicalOffset,
    PhysicalRect, PhysicalSize,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Benchmark errors.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Benchmark failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fixture error: {0}")]
    Fixture(#[from] LayoutError),
}

/// A single benchmark result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Name of the benchmark.
    pub name: String,
    /// Number of iterations.
    pub iterations: u64,
    /// Total time in nanoseconds.
    pub total_ns: u64,
    /// Mean time per iteration in nanoseconds.
    pub mean_ns: u64,
    /// Standard deviation in nanoseconds.
    pub std_dev_ns: u64,
    /// Minimum time in nanoseconds.
    pub min_ns: u64,
    /// Maximum time in nanoseconds.
    pub max_ns: u64,
    /// Throughput in operations per second.
    pub ops_per_sec: f64,
}

impl BenchmarkResult {
    /// Create a new result from sample times.
    pub fn from_samples(name: impl Into<String>, samples: &[Duration]) -> Self {
        let name = name.into();
        let iterations = samples.len() as u64;

        let times_ns: Vec<u64> = samples.iter().map(|d| d.as_nanos() as u64).collect();
        let total_ns: u64 = times_ns.iter().sum();
        let mean_ns = total_ns / iterations;
        let min_ns = *times_ns.iter().min().unwrap_or(&0);
        let max_ns = *times_ns.iter().max().unwrap_or(&0);

        // Calculate standard deviation
        let variance: f64 = times_ns
            .iter()
            .map(|&t| {
                let diff = t as f64 - mean_ns as f64;
                diff * diff
            })
            .sum::<f64>()
            / iterations as f64;
        let std_dev_ns = variance.sqrt() as u64;

        let ops_per_sec = if mean_ns > 0 {
            1_000_000_000.0 / mean_ns as f64
        } else {
            0.0
        };

        Self {
            name,
            iterations,
            total_ns,
            mean_ns,
            std_dev_ns,
            min_ns,
            max_ns,
            ops_per_sec,
        }
    }

    /// Format the mean time as a human-readable string.
    pub fn format_mean(&self) -> String {
        format_duration(self.mean_ns)
    }

    /// Print a summary line.
    pub fn print_line(&self) {
        println!(
            "{:40} {:>12} {:>12} {:>12}/s",
            self.name,
            self.format_mean(),
            format!("±{}", format_duration(self.std_dev_ns)),
            format_ops(self.ops_per_sec),
        );
    }
}

/// Format nanoseconds as human-readable duration.
fn format_duration(ns: u64) -> String {
    if ns >= 1_000_000_000 {
        format!("{:.2} s", ns as f64 / 1_000_000_000.0)
    } else if ns >= 1_000_000 {
        format!("{:.2} ms", ns as f64 / 1_000_000.0)
    } else if ns >= 1_000 {
        format!("{:.2} µs", ns as f64 / 1_000.0)
    } else {
        format!("{} ns", ns)
    }
}

/// Format operations per second.
fn format_ops(ops: f64) -> String {
    if ops >= 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops >= 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{:.2}", ops)
    }
}

/// Collection of benchmark results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    /// Suite name.
    pub name: String,
    /// Individual results.
    pub results: Vec<BenchmarkResult>,
    /// Total time.
    pub total_time: Duration,
}

impl BenchmarkSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Vec::new(),
            total_time: Duration::ZERO,
        }
    }

    pub fn add(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }

    /// Print summary of all results.
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(80));
        println!("Benchmark Suite: {}", self.name);
        println!("{}", "=".repeat(80));
        println!(
            "{:40} {:>12} {:>12} {:>12}",
            "Name", "Mean", "StdDev", "Throughput"
        );
        println!("{}", "-".repeat(80));

        for result in &self.results {
            result.print_line();
        }

        println!("{}", "-".repeat(80));
        println!("Total time: {:?}", self.total_time);
        println!();
    }

    /// Save results to JSON file.
    pub fn save_json(&self, path: &str) -> Result<(), BenchError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| BenchError::Failed(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Benchmark runner.
pub struct Benchmark {
    /// Number of warmup iterations.
    pub warmup: u64,
    /// Number of measured iterations.
    pub iterations: u64,
}

impl Benchmark {
    pub fn new() -> Self {
        Self {
            warmup: 10,
            iterations: 100,
        }
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_warmup(mut self, warmup: u64) -> Self {
        self.warmup = warmup;
        self
    }

    /// Run a benchmark function.
    pub fn run<F>(&self, name: &str, mut f: F) -> BenchmarkResult
    where
        F: FnMut(),
    {
        debug!(
            name,
            warmup = self.warmup,
            iterations = self.iterations,
            "Running benchmark"
        );

        // Warmup
        for _ in 0..self.warmup {
            f();
        }

        // Measure
        let mut samples = Vec::with_capacity(self.iterations as usize);
        for _ in 0..self.iterations {
            let start = Instant::now();
            f();
            samples.push(start.elapsed());
        }

        BenchmarkResult::from_samples(name, &samples)
    }

    /// Run all standard benchmarks.
    pub fn run_all(&self) -> Result<BenchmarkSuite, BenchError> {
        let start = Instant::now();
        let mut suite = BenchmarkSuite::new("RustKit Geometry");

        suite.add(self.bench_overflow_flat(100)?);
        suite.add(self.bench_overflow_deep(50)?);
        for (writing_mode, direction) in WRITING_MODES {
            suite.add(self.bench_scroller(writing_mode, direction)?);
        }
        suite.add(self.bench_background()?);

        suite.total_time = start.elapsed();
        Ok(suite)
    }

    fn bench_overflow_flat(&self, children: usize) -> Result<BenchmarkResult, BenchError> {
        let (mut tree, root) = build_flat_tree(children)?;
        let mut failure = None;
        let result = self.run(&format!("overflow/flat ({children} boxes)"), || {
            if let Err(err) = tree.compute_overflow(root) {
                failure = Some(err);
            }
        });
        match failure {
            Some(err) => Err(err.into()),
            None => Ok(result),
        }
    }

    fn bench_overflow_deep(&self, depth: usize) -> Result<BenchmarkResult, BenchError> {
        let (mut tree, root) = build_deep_tree(depth)?;
        let mut failure = None;
        let result = self.run(&format!("overflow/deep ({depth} levels)"), || {
            if let Err(err) = tree.compute_overflow(root) {
                failure = Some(err);
            }
        });
        match failure {
            Some(err) => Err(err.into()),
            None => Ok(result),
        }
    }

    fn bench_scroller(
        &self,
        writing_mode: &str,
        direction: &str,
    ) -> Result<BenchmarkResult, BenchError> {
        let mut failure = None;
        let result = self.run(&format!("scroll/update ({writing_mode} {direction})"), || {
            if let Err(err) = build_scroller(writing_mode, direction, (2000, 1000)) {
                failure = Some(err);
            }
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(result),
        }
    }

    fn bench_background(&self) -> Result<BenchmarkResult, BenchError> {
        let (tree, id) = build_background_box("background-size: 37px 23px; background-repeat: space round")?;
        let image = ImageSizingInfo::from_natural_size(37.0, 23.0);
        let viewport = PhysicalRect::from_ints(0, 0, 1280, 720);
        let mut failure = None;
        let result = self.run("background/space-round", || {
            if let Err(err) =
                tree.background_geometry(id, 0, &image, PhysicalOffset::default(), viewport)
            {
                failure = Some(err);
            }
        });
        match failure {
            Some(err) => Err(err.into()),
            None => Ok(result),
        }
    }
}

impl Default for Benchmark {
    fn default() -> Self {
        Self::new()
    }
}

/// Every writing mode and direction pair.
pub const WRITING_MODES: [(&str, &str); 6] = [
    ("horizontal-tb", "ltr"),
    ("horizontal-tb", "rtl"),
    ("vertical-lr", "ltr"),
    ("vertical-lr", "rtl"),
    ("vertical-rl", "ltr"),
    ("vertical-rl", "rtl"),
];

fn style(css: &str) -> Result<ComputedStyle, BenchError> {
    ComputedStyle::from_declarations(css).map_err(|e| BenchError::Failed(e.to_string()))
}

/// A root with `n` stacked 100px children, every tenth one overflowing.
pub fn build_flat_tree(n: usize) -> Result<(LayoutTree, BoxId), BenchError> {
    let mut tree = LayoutTree::default();
    let root = tree.create_box(NodeKind::Block, ComputedStyle::new());
    tree.set_size(root, PhysicalSize::from_ints(800, 600))?;
    for i in 0..n {
        let child = tree.create_box(NodeKind::Block, ComputedStyle::new());
        tree.append_child(root, child)?;
        let width = if i % 10 == 0 { 1200 } else { 800 };
        tree.set_size(child, PhysicalSize::from_ints(width, 100))?;
        tree.set_location(child, PhysicalOffset::from_ints(0, 100 * i as i32))?;
    }
    Ok((tree, root))
}

/// A chain of `depth` boxes alternating between horizontal and vertical-rl.
pub fn build_deep_tree(depth: usize) -> Result<(LayoutTree, BoxId), BenchError> {
    let mut tree = LayoutTree::default();
    let horizontal = ComputedStyle::new();
    let vertical = style("writing-mode: vertical-rl")?;
    let root = tree.create_box(NodeKind::Block, horizontal.clone());
    tree.set_size(root, PhysicalSize::from_ints(800, 600))?;
    let mut parent = root;
    for i in 0..depth {
        let kind_style = if i % 2 == 0 { vertical.clone() } else { horizontal.clone() };
        let child = tree.create_box(NodeKind::Block, kind_style);
        tree.append_child(parent, child)?;
        tree.set_size(child, PhysicalSize::from_ints(700 - i as i32, 500 - i as i32))?;
        tree.set_location(child, PhysicalOffset::from_ints(1, 1))?;
        parent = child;
    }
    Ok((tree, root))
}

/// A 540x400 scroll container with padding, border and a child of
/// `content` size, laid out and updated.
pub fn build_scroller(
    writing_mode: &str,
    direction: &str,
    content: (i32, i32),
) -> Result<(LayoutTree, BoxId), BenchError> {
    let mut tree = LayoutTree::default();
    let container = tree.create_box(
        NodeKind::Block,
        style(&format!(
            "overflow: scroll; padding: 10px 20px 30px 40px; \
             border-width: 20px 30px 40px 50px; border-style: solid; \
             writing-mode: {writing_mode}; direction: {direction}"
        ))?,
    );
    tree.set_size(container, PhysicalSize::from_ints(540, 400))?;
    let child = tree.create_box(NodeKind::Block, ComputedStyle::new());
    tree.append_child(container, child)?;
    tree.set_size(child, PhysicalSize::from_ints(content.0, content.1))?;

    let mut ctx = LayoutContext::new();
    tree.compute_overflow(container)?;
    tree.update_after_layout(container, &mut ctx)?;
    Ok((tree, container))
}

/// A 1280x720 box with `css` as its background declarations.
pub fn build_background_box(css: &str) -> Result<(LayoutTree, BoxId), BenchError> {
    let mut tree = LayoutTree::default();
    let id = tree.create_box(NodeKind::Block, style(css)?);
    tree.set_size(id, PhysicalSize::from_ints(1280, 720))?;
    Ok((tree, id))
}
