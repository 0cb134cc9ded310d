//! Ejecución de cada subcomando. Devuelven el código de salida del proceso.

use std::time::Duration;

use forge_adapters::archive::{extract_archive, ArchiveInjector, DirectorySource, PatternFilter, ZipSource};
use forge_cache::{CacheConfig, CacheService};
use forge_core::CoreError;
use log::{error, info, warn};

use crate::commands::{CacheArgs, CacheCommand, ExtractArgs, FilterArgs, InjectArgs};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

fn filter_from(args: &FilterArgs) -> Result<PatternFilter, CoreError> {
    PatternFilter::new(&args.includes, &args.excludes)
}

pub fn handle_inject(args: &InjectArgs) -> i32 {
    let result = filter_from(&args.filter).and_then(|filter| {
                                              let filter = std::sync::Arc::new(filter);
                                              let mut injector = ArchiveInjector::new();
                                              for source in &args.sources {
                                                  if source.is_dir() {
                                                      injector.push(Box::new(DirectorySource::new(source).with_shared_filter(filter.clone())));
                                                  } else {
                                                      injector.push(Box::new(ZipSource::new(source).with_shared_filter(filter.clone())));
                                                  }
                                              }
                                              injector.inject(&args.output)
                                          });
    match result {
        Ok(report) => {
            for warning in report.warnings() {
                warn!("{warning}");
            }
            println!("{} entries written to {}", report.entries.len(), args.output.display());
            EXIT_OK
        }
        Err(e) => {
            error!("inject failed: {e}");
            EXIT_FAILURE
        }
    }
}

pub fn handle_extract(args: &ExtractArgs) -> i32 {
    let result = filter_from(&args.filter).and_then(|filter| extract_archive(&args.archive, &args.output, &filter));
    match result {
        Ok(files) => {
            println!("{files} files extracted to {}", args.output.display());
            EXIT_OK
        }
        Err(e) => {
            error!("extract failed: {e}");
            EXIT_FAILURE
        }
    }
}

fn service_for(args: &CacheArgs) -> CacheService {
    let mut config = CacheConfig::from_env();
    if let Some(dir) = &args.dir {
        config.root = dir.clone();
    }
    CacheService::new(config)
}

pub fn handle_cache(args: &CacheArgs) -> i32 {
    let service = service_for(args);
    info!("cache root: {}", service.root().display());
    let outcome = match &args.command {
        CacheCommand::List { json } => service.list().map(|entries| {
                                                         if *json {
                                                             print_json(&entries);
                                                         } else {
                                                             for entry in &entries {
                                                                 println!("{}  {:>10}  {}  {}",
                                                                          entry.manifest.fingerprint,
                                                                          entry.manifest.size,
                                                                          entry.last_used.format("%Y-%m-%d %H:%M"),
                                                                          entry.manifest.step);
                                                             }
                                                         }
                                                         EXIT_OK
                                                     }),
        CacheCommand::Verify => service.verify().map(|report| {
                                                    for (fingerprint, reason) in &report.corrupt {
                                                        println!("corrupt {fingerprint}: {reason}");
                                                    }
                                                    println!("{} entries checked, {} corrupt", report.checked, report.corrupt.len());
                                                    if report.corrupt.is_empty() {
                                                        EXIT_OK
                                                    } else {
                                                        EXIT_FAILURE
                                                    }
                                                }),
        CacheCommand::Prune { max_age_days } => {
            let max_age = match max_age_days {
                Some(days) => Duration::from_secs(days.saturating_mul(86_400)),
                None => service.config().retention(),
            };
            service.prune(max_age).map(|summary| {
                                      println!("removed {} entries ({} bytes), {} in use",
                                               summary.removed, summary.reclaimed_bytes, summary.locked_skipped);
                                      EXIT_OK
                                  })
        }
        CacheCommand::Sweep => service.sweep_partials().map(|removed| {
                                                          println!("removed {removed} partial outputs");
                                                          EXIT_OK
                                                      }),
        CacheCommand::Stats { json } => service.stats().map(|stats| {
                                                          if *json {
                                                              print_json(&stats);
                                                          } else {
                                                              println!("{} entries, {} bytes, {} partials",
                                                                       stats.entries, stats.total_bytes, stats.partials);
                                                          }
                                                          EXIT_OK
                                                      }),
        CacheCommand::Remove { fingerprint } => service.remove(fingerprint).map(|removed| {
                                                                              if removed {
                                                                                  EXIT_OK
                                                                              } else {
                                                                                  println!("no entry {fingerprint}");
                                                                                  EXIT_FAILURE
                                                                              }
                                                                          }),
    };
    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("cache command failed: {e}");
            EXIT_FAILURE
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("cannot render json: {e}"),
    }
}
