// Copyright (c) 2022 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://spdx.org/licenses/MIT
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging engine and its interfaces.

pub use log;

use std::sync::Once;

static INIT: Once = Once::new();
static LOGGER: StderrLogger = StderrLogger;

/// Initialize logging to stderr. The level filter is taken from the
/// `RUST_LOG` environment variable, defaulting to `info`. Safe to call more
/// than once; subsequent calls are no-ops.
pub fn init_logging() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).expect("no other logger has been installed");
        log::set_max_level(level_filter_from_env());
    })
}

fn level_filter_from_env() -> log::LevelFilter {
    match std::env::var("RUST_LOG").as_deref() {
        Ok("off") => log::LevelFilter::Off,
        Ok("error") => log::LevelFilter::Error,
        Ok("warn") => log::LevelFilter::Warn,
        Ok("debug") => log::LevelFilter::Debug,
        Ok("trace") => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    }
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{:<5} {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}
