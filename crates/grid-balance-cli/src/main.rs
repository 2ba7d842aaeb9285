// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use chrono::{DateTime, Utc};
use grid_balance_model::prelude::{HouseIndex, Network, NetworkLoader, NetworkWriter};
use grid_balance_solver::prelude::{IteratedLocalSearch, SolverConfig};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const DEFAULT_PENALTY: f64 = 50.0;

fn find_instances_dir() -> Option<PathBuf> {
    let mut cur: Option<&Path> = Some(Path::new(env!("CARGO_MANIFEST_DIR")));
    while let Some(p) = cur {
        let cand = p.join("instances");
        if cand.is_dir() {
            return Some(cand);
        }
        cur = p.parent();
    }
    None
}

fn instances() -> impl Iterator<Item = (Network, PathBuf)> {
    let inst_dir = find_instances_dir()
        .expect("Could not find an `instances/` directory in any ancestor of CARGO_MANIFEST_DIR");
    let mut files: Vec<PathBuf> = std::fs::read_dir(&inst_dir)
        .expect("read_dir(instances) failed")
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().map(|ft| ft.is_file()).unwrap_or(false)
                && e.path().extension().map(|x| x == "txt").unwrap_or(false)
                && !e
                    .path()
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.ends_with("_solved"))
                    .unwrap_or(false)
        })
        .map(|e| e.path())
        .collect();

    files.sort();
    files.into_iter().filter_map(|path| {
        let loader = NetworkLoader::new().penalty(DEFAULT_PENALTY);
        match loader.from_path(&path) {
            Ok(network) => Some((network, path)),
            Err(e) => {
                tracing::error!("Skipping {}: {}", path.display(), e);
                None
            }
        }
    })
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[derive(Serialize)]
struct RunRecord {
    iteration: usize,
    filename: String,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
    runtime_ms: u128,
    cost: Option<f64>,
}

/// Per-generator report of the optimized network plus the global
/// statistics.
fn report_network(network: &Network) {
    let mut names: Vec<&str> = network.generators().iter().map(|g| g.name()).collect();
    names.sort_unstable();

    for name in names {
        let Some(index) = network.generator_index(name) else {
            continue;
        };
        let generator = network.generator(index);

        let mut houses: Vec<String> = (0..network.houses().len())
            .filter(|&i| network.assigned_generator(HouseIndex::new(i)) == Some(index))
            .map(|i| {
                let house = network.house(HouseIndex::new(i));
                format!("{}({})", house.name(), house.demand())
            })
            .collect();
        houses.sort_unstable();

        let utilization = generator.utilization();
        tracing::info!(
            "{} capacity={} load={} utilization={:.3}{} houses=[{}]",
            generator.name(),
            generator.capacity(),
            generator.load(),
            utilization,
            if utilization > 1.0 { " OVERLOADED" } else { "" },
            houses.join(", ")
        );
    }

    let stats = network.stats();
    tracing::info!(
        "mean={:.5} dispersion={:.5} overload={:.5} penalty={:.5} cost={:.5}",
        stats.mean_utilization,
        stats.dispersion,
        stats.overload,
        network.penalty(),
        stats.cost
    );
}

fn solved_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("instance");
    path.with_file_name(format!("{stem}_solved.txt"))
}

fn main() {
    enable_tracing();

    let mut results: Vec<RunRecord> = Vec::new();

    for (iter, (mut network, path)) in instances().enumerate() {
        let iteration = iter + 1;
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        tracing::info!(
            "Solving [{}] {} with {} generators and {} houses",
            iteration,
            filename,
            network.generators().len(),
            network.houses().len()
        );

        let start_ts = Utc::now();
        let t0 = Instant::now();

        let solver = IteratedLocalSearch::new(SolverConfig {
            seed: 40 + iteration as u64,
            ..SolverConfig::default()
        });
        let outcome = solver.optimize(&mut network);

        let runtime = t0.elapsed();
        let end_ts = Utc::now();

        let cost_opt = match outcome {
            Ok(cost) => {
                tracing::info!(
                    "Finished [{}] {}: cost={:.5}, runtime={:?}",
                    iteration,
                    filename,
                    cost,
                    runtime
                );
                report_network(&network);

                let out = solved_path(&path);
                match NetworkWriter.to_path(&network, &out) {
                    Ok(()) => tracing::info!("Wrote optimized network to {}", out.display()),
                    Err(e) => {
                        tracing::error!("Failed to write {}: {}", out.display(), e)
                    }
                }
                Some(cost)
            }
            Err(e) => {
                tracing::error!("Failed [{}] {}: {} (runtime={:?})", iteration, filename, e, runtime);
                None
            }
        };

        results.push(RunRecord {
            iteration,
            filename,
            start_ts,
            end_ts,
            runtime_ms: runtime.as_millis(),
            cost: cost_opt,
        });
    }

    let out_path = PathBuf::from("solver_results.json");
    match File::create(&out_path).and_then(|mut f| {
        let json = serde_json::to_string_pretty(&results).expect("serialize results");
        f.write_all(json.as_bytes())
    }) {
        Ok(()) => {
            tracing::info!(
                "Wrote {} run record(s) to {}",
                results.len(),
                out_path.display()
            );
        }
        Err(e) => {
            tracing::error!("Failed to write results to {}: {}", out_path.display(), e);
        }
    }
}
