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

use std::sync::Arc;

pub type EventHandler<E> = Arc<dyn Fn(E) + Send + Sync>;

/// Keeps a list of subscribers and broadcasts events to all of them.
///
/// Handlers are invoked synchronously on the broadcasting thread, in
/// subscription order. A handler must not call back into the object that is
/// broadcasting.
pub struct EventsController<E> {
    event_subscribers: Vec<EventHandler<E>>,
}

impl<E: Clone> EventsController<E> {
    pub fn new() -> Self {
        Self {
            event_subscribers: Vec::new(),
        }
    }

    pub fn subscribers(&self) -> &Vec<EventHandler<E>> {
        &self.event_subscribers
    }

    pub fn subscribe_to_events(&mut self, handler: EventHandler<E>) {
        self.event_subscribers.push(handler)
    }

    pub fn broadcast(&self, event: E) {
        self.event_subscribers.iter().for_each(|f| f(event.clone()))
    }
}

impl<E: Clone> Default for EventsController<E> {
    fn default() -> Self {
        Self::new()
    }
}
