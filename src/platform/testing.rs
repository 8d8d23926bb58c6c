//! In-memory platform fakes for tests

use super::traits::*;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

pub struct FakeAuthorization {
    denied: Mutex<HashSet<Permission>>,
    version: AtomicU32,
}

impl FakeAuthorization {
    pub fn granted() -> Arc<Self> {
        Arc::new(Self {
            denied: Mutex::new(HashSet::new()),
            version: AtomicU32::new(34),
        })
    }

    pub fn deny(&self, permission: Permission) {
        self.denied.lock().insert(permission);
    }

    pub fn set_version(&self, version: u32) {
        self.version.store(version, Ordering::SeqCst);
    }
}

impl AuthorizationProvider for FakeAuthorization {
    fn is_granted(&self, permission: Permission) -> bool {
        !self.denied.lock().contains(&permission)
    }

    fn platform_version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct MemoryEntry {
    pub uri: MediaUri,
    pub values: MediaValues,
    pub deleted: bool,
    pub data: Arc<Mutex<Vec<u8>>>,
}

#[derive(Default)]
pub struct MemoryMediaIndex {
    entries: Mutex<Vec<MemoryEntry>>,
    pub refuse_insert: AtomicBool,
    pub refuse_handle: AtomicBool,
    pub fail_open: AtomicBool,
    pub fail_update: AtomicBool,
    pub insert_count: AtomicUsize,
}

impl MemoryMediaIndex {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<MemoryEntry> {
        self.entries.lock().clone()
    }

    pub fn inserts(&self) -> usize {
        self.insert_count.load(Ordering::SeqCst)
    }

    fn with_entry<T>(&self, uri: &MediaUri, f: impl FnOnce(&mut MemoryEntry) -> T) -> io::Result<T> {
        let mut entries = self.entries.lock();
        entries
            .iter_mut()
            .find(|e| &e.uri == uri && !e.deleted)
            .map(f)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, uri.to_string()))
    }
}

struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MediaIndex for MemoryMediaIndex {
    fn insert(&self, values: &MediaValues) -> Option<MediaUri> {
        self.insert_count.fetch_add(1, Ordering::SeqCst);
        if self.refuse_insert.load(Ordering::SeqCst) {
            return None;
        }
        let mut entries = self.entries.lock();
        let uri = MediaUri::new(format!("memory://audio/{}", entries.len() + 1));
        entries.push(MemoryEntry {
            uri: uri.clone(),
            values: values.clone(),
            deleted: false,
            data: Arc::new(Mutex::new(Vec::new())),
        });
        Some(uri)
    }

    fn open_write(&self, uri: &MediaUri) -> io::Result<Option<OutputHandle>> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"));
        }
        if self.refuse_handle.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let data = self.with_entry(uri, |e| e.data.clone())?;
        Ok(Some(OutputHandle::new(uri.clone(), Box::new(SharedBuffer(data)))))
    }

    fn set_pending(&self, uri: &MediaUri, pending: bool) -> io::Result<()> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "index unavailable"));
        }
        self.with_entry(uri, |e| e.values.is_pending = pending)
    }

    fn delete(&self, uri: &MediaUri) -> io::Result<()> {
        self.with_entry(uri, |e| e.deleted = true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Configure(RecorderConfig),
    Prepare,
    Start,
    Stop,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFailure {
    Io,
    MicInUse,
}

impl EngineFailure {
    fn to_error(self) -> EngineError {
        match self {
            EngineFailure::Io => EngineError::Io(io::Error::new(io::ErrorKind::Other, "prepare failed")),
            EngineFailure::MicInUse => EngineError::IllegalState("microphone in use".to_string()),
        }
    }
}

#[derive(Default)]
pub struct FakeRecorderFactory {
    pub calls: Arc<Mutex<Vec<EngineCall>>>,
    pub created: AtomicUsize,
    pub fail_prepare: Mutex<Option<EngineFailure>>,
    pub fail_start: Mutex<Option<EngineFailure>>,
    pub fail_stop: AtomicBool,
}

impl FakeRecorderFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl RecorderFactory for FakeRecorderFactory {
    fn create(&self) -> Box<dyn RecorderEngine> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(FakeEngine {
            calls: self.calls.clone(),
            output: None,
            fail_prepare: *self.fail_prepare.lock(),
            fail_start: *self.fail_start.lock(),
            fail_stop: self.fail_stop.load(Ordering::SeqCst),
        })
    }
}

struct FakeEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    output: Option<OutputHandle>,
    fail_prepare: Option<EngineFailure>,
    fail_start: Option<EngineFailure>,
    fail_stop: bool,
}

#[async_trait]
impl RecorderEngine for FakeEngine {
    fn configure(&mut self, config: &RecorderConfig, output: OutputHandle) -> Result<(), EngineError> {
        self.calls.lock().push(EngineCall::Configure(*config));
        self.output = Some(output);
        Ok(())
    }

    async fn prepare(&mut self) -> Result<(), EngineError> {
        self.calls.lock().push(EngineCall::Prepare);
        match self.fail_prepare {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    async fn start(&mut self) -> Result<(), EngineError> {
        self.calls.lock().push(EngineCall::Start);
        if let Some(failure) = self.fail_start {
            return Err(failure.to_error());
        }
        if let Some(output) = self.output.as_mut() {
            output.write_all(b"ftypM4A ")?;
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EngineError> {
        self.calls.lock().push(EngineCall::Stop);
        if self.fail_stop {
            return Err(EngineError::IllegalState("stop called before any data".to_string()));
        }
        Ok(())
    }

    fn release(&mut self) {
        self.calls.lock().push(EngineCall::Release);
        self.output = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForegroundEvent {
    Started(ForegroundNotice),
    Stopped,
}

#[derive(Default)]
pub struct FakeForeground {
    events: Mutex<Vec<ForegroundEvent>>,
    active: AtomicBool,
}

impl FakeForeground {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ForegroundEvent> {
        self.events.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl ForegroundHost for FakeForeground {
    fn start_foreground(&self, notice: &ForegroundNotice) {
        self.active.store(true, Ordering::SeqCst);
        self.events.lock().push(ForegroundEvent::Started(notice.clone()));
    }

    fn stop_foreground(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.events.lock().push(ForegroundEvent::Stopped);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierEvent {
    Setup { urgent: bool },
    Cancel,
}

#[derive(Default)]
pub struct FakeNotifier {
    events: Mutex<Vec<NotifierEvent>>,
}

impl FakeNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<NotifierEvent> {
        self.events.lock().clone()
    }

    pub fn last(&self) -> Option<NotifierEvent> {
        self.events.lock().last().copied()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl CallNotifier for FakeNotifier {
    fn setup_notification(&self, urgent: bool) {
        self.events.lock().push(NotifierEvent::Setup { urgent });
    }

    fn cancel_notification(&self) {
        self.events.lock().push(NotifierEvent::Cancel);
    }
}

#[derive(Default)]
pub struct FakeLauncher {
    pub fail: AtomicBool,
    launches: AtomicUsize,
}

impl FakeLauncher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl CallScreenLauncher for FakeLauncher {
    fn launch(&self) -> LaunchResult {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            LaunchResult::Failed("background activity start blocked".to_string())
        } else {
            LaunchResult::Launched
        }
    }
}

pub struct FakeDevice {
    pub interactive: AtomicBool,
    pub locked: AtomicBool,
}

impl FakeDevice {
    /// Awake and unlocked
    pub fn unlocked() -> Arc<Self> {
        Arc::new(Self {
            interactive: AtomicBool::new(true),
            locked: AtomicBool::new(false),
        })
    }
}

impl DeviceStatus for FakeDevice {
    fn is_interactive(&self) -> bool {
        self.interactive.load(Ordering::SeqCst)
    }

    fn is_device_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }
}
