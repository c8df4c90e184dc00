#![allow(dead_code)]

use async_trait::async_trait;
use patch_sync::{
    ChannelSink, Notification, NotificationSink, Patch, PatchRemote, RemoteError, Settings,
    MAX_PATCHES,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
    Reorder,
    GetSettings,
    SetSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(Patch),
    Update { index: usize, patch: Patch },
    Delete { index: usize },
    Reorder(Vec<Patch>),
    GetSettings,
    SetSettings(Settings),
}

impl Call {
    pub fn op(&self) -> Op {
        match self {
            Call::List => Op::List,
            Call::Create(_) => Op::Create,
            Call::Update { .. } => Op::Update,
            Call::Delete { .. } => Op::Delete,
            Call::Reorder(_) => Op::Reorder,
            Call::GetSettings => Op::GetSettings,
            Call::SetSettings(_) => Op::SetSettings,
        }
    }
}

/// In-memory stand-in for the device: same index rules, same error bodies.
pub struct MockRemote {
    store: Mutex<Vec<Patch>>,
    settings: Mutex<Settings>,
    failing: Mutex<HashSet<Op>>,
    calls: Mutex<Vec<Call>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockRemote {
    pub fn new(patches: Vec<Patch>) -> Self {
        Self {
            store: Mutex::new(patches),
            settings: Mutex::new(Settings {
                brightness: 1,
                live_gig_mode: None,
            }),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    pub fn store(&self) -> Vec<Patch> {
        self.store.lock().unwrap().clone()
    }

    pub fn stored_settings(&self) -> Settings {
        *self.settings.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.calls().iter().map(Call::op).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn begin(&self, call: Call) -> Result<(), RemoteError> {
        let op = call.op();
        self.calls.lock().unwrap().push(call);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(&op) {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }
        Ok(())
    }
}

fn bad_request(message: &str) -> RemoteError {
    RemoteError::Status {
        status: 400,
        message: message.to_string(),
    }
}

#[async_trait]
impl PatchRemote for MockRemote {
    async fn list(&self) -> Result<Vec<Patch>, RemoteError> {
        self.begin(Call::List).await?;
        Ok(self.store())
    }

    async fn create(&self, patch: &Patch) -> Result<(), RemoteError> {
        self.begin(Call::Create(patch.clone())).await?;
        let mut store = self.store.lock().unwrap();
        if store.len() >= MAX_PATCHES {
            return Err(bad_request("Maximum number of patches reached"));
        }
        store.push(patch.clone());
        Ok(())
    }

    async fn update_at(&self, index: usize, patch: &Patch) -> Result<(), RemoteError> {
        self.begin(Call::Update {
            index,
            patch: patch.clone(),
        })
        .await?;
        let mut store = self.store.lock().unwrap();
        match store.get_mut(index) {
            Some(slot) => {
                *slot = patch.clone();
                Ok(())
            }
            None => Err(bad_request("Invalid patch index")),
        }
    }

    async fn delete_at(&self, index: usize) -> Result<(), RemoteError> {
        self.begin(Call::Delete { index }).await?;
        let mut store = self.store.lock().unwrap();
        if index >= store.len() {
            return Err(bad_request("Invalid patch index"));
        }
        store.remove(index);
        Ok(())
    }

    async fn reorder(&self, patches: &[Patch]) -> Result<(), RemoteError> {
        self.begin(Call::Reorder(patches.to_vec())).await?;
        *self.store.lock().unwrap() = patches.to_vec();
        Ok(())
    }

    async fn get_settings(&self) -> Result<Settings, RemoteError> {
        self.begin(Call::GetSettings).await?;
        Ok(self.stored_settings())
    }

    async fn set_settings(&self, settings: &Settings) -> Result<(), RemoteError> {
        self.begin(Call::SetSettings(*settings)).await?;
        *self.settings.lock().unwrap() = *settings;
        Ok(())
    }
}

pub fn patches(items: &[(&str, i32)]) -> Vec<Patch> {
    items.iter().map(|(n, t)| Patch::new(*n, *t)).collect()
}

pub fn names(patches: &[Patch]) -> Vec<String> {
    patches.iter().map(|p| p.name.clone()).collect()
}

pub fn channel_sink() -> (Arc<dyn NotificationSink>, mpsc::UnboundedReceiver<Notification>) {
    let (sink, rx) = ChannelSink::new();
    let sink: Arc<dyn NotificationSink> = Arc::new(sink);
    (sink, rx)
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}
