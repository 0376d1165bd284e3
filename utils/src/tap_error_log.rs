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

use logging::log;

/// Log the error side of a `Result` as it passes through, leaving the value
/// untouched.
pub trait LogError {
    fn log_err(self) -> Self;
    fn log_err_pfx(self, prefix: &str) -> Self;
}

impl<T, E: std::fmt::Display> LogError for Result<T, E> {
    fn log_err(self) -> Self {
        if let Err(e) = &self {
            log::error!("{e}");
        }
        self
    }

    fn log_err_pfx(self, prefix: &str) -> Self {
        if let Err(e) = &self {
            log::error!("{prefix}: {e}");
        }
        self
    }
}
