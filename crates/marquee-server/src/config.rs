// Copyright 2025 Marquee Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use marquee_client::CatalogClientConfig;
use marquee_common::Result;
use std::net::SocketAddr;

/// Port the review service listens on by default.
pub const DEFAULT_PORT: u16 = 8082;

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub catalog: CatalogClientConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            catalog: CatalogClientConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_catalog(mut self, catalog: CatalogClientConfig) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()
    }
}
