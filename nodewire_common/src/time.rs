/*
 * Copyright © 2026, the nodewire authors.
 *
 * Licensed under the Apache License, Version 2.0 (the "License"); you may not use this
 * file except in compliance with the License. You may obtain a copy of the License at
 * http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
use std::time::Duration;

#[inline] pub fn days(n: u64) -> Duration { Duration::from_secs(n * 60 * 60 * 24) }
#[inline] pub fn hours(n: u64) -> Duration { Duration::from_secs(n * 60 * 60) }
#[inline] pub fn minutes(n: u64) -> Duration { Duration::from_secs(n * 60) }
#[inline] pub fn secs(n: u64) -> Duration { Duration::from_secs(n) }
#[inline] pub fn millis(n: u64) -> Duration { Duration::from_millis(n) }
#[inline] pub fn micros(n: u64) -> Duration { Duration::from_micros(n) }
#[inline] pub fn nanos(n: u64) -> Duration { Duration::from_nanos(n) }
