//! FFI exports for the C host extension
//!
//! All functions in this module are exported with `#[no_mangle]`
//! and use C-compatible types for cross-language interop. The host hands
//! its registration/rendering services over as a table of callbacks.

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::ptr;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{IniEntry, ModuleConfig, ALLOW_PERSISTENT_KEY, SHOW_WARNINGS_KEY};
use crate::diagnostics::{DiagnosticSink, LogCrateSink, NativeLogEvent};
use crate::error::Error;
use crate::host::{ConstantValue, HostBindings};
use crate::lifecycle::LibraryState;
use crate::module::FfmpegModule;

// Thread-local error storage
thread_local! {
    static LAST_ERROR: std::cell::RefCell<Option<CString>> = std::cell::RefCell::new(None);
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// The process-wide module instance driven from C.
///
/// The lock only guards the slot; it is released before any host callback
/// runs, so callbacks may re-enter the exported functions.
static MODULE: Mutex<Option<Arc<FfmpegModule>>> = parking_lot::const_mutex(None);

fn current_module() -> Option<Arc<FfmpegModule>> {
    MODULE.lock().clone()
}

/// Module to start. One that never got past `Uninitialized` is replaced,
/// so a retry after a failed startup picks up the retry's config.
fn module_for_startup(
    slot: &mut Option<Arc<FfmpegModule>>,
    build: impl FnOnce() -> FfmpegModule,
) -> Arc<FfmpegModule> {
    if let Some(module) = slot
        .as_ref()
        .filter(|m| m.state() != LibraryState::Uninitialized)
    {
        return module.clone();
    }
    slot.insert(Arc::new(build())).clone()
}

// =============================================================================
// Result Type
// =============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfmResult {
    Success = 0,
    ErrorLifecycle = 1,
    ErrorNotInitialized = 2,
    ErrorMemory = 3,
    ErrorConfiguration = 4,
    ErrorFFmpeg = 5,
    ErrorInvalidArgument = 6,
}

impl From<Error> for FfmResult {
    fn from(e: Error) -> Self {
        set_last_error(&e.to_string());
        match e {
            Error::Lifecycle(_) => FfmResult::ErrorLifecycle,
            Error::NotInitialized => FfmResult::ErrorNotInitialized,
            Error::Memory => FfmResult::ErrorMemory,
            Error::Configuration { .. } => FfmResult::ErrorConfiguration,
            Error::FFmpeg { .. } => FfmResult::ErrorFFmpeg,
        }
    }
}

impl<T> From<Result<T, Error>> for FfmResult {
    fn from(r: Result<T, Error>) -> Self {
        match r {
            Ok(_) => FfmResult::Success,
            Err(e) => e.into(),
        }
    }
}

// =============================================================================
// Host Callbacks
// =============================================================================

type StrCallback = Option<extern "C" fn(*mut c_void, *const c_char)>;
type StrPairCallback = Option<extern "C" fn(*mut c_void, *const c_char, *const c_char)>;
type VoidCallback = Option<extern "C" fn(*mut c_void)>;

/// Host services as C callbacks. Any entry may be null.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfmHostCallbacks {
    /// Passed back as the first argument of every callback
    pub user_data: *mut c_void,
    /// (name, default)
    pub register_ini_entry: StrPairCallback,
    pub unregister_ini_entries: VoidCallback,
    pub register_class: StrCallback,
    /// (name, value)
    pub register_string_constant: StrPairCallback,
    /// (name, value)
    pub register_long_constant: Option<extern "C" fn(*mut c_void, *const c_char, i64)>,
    pub info_table_start: VoidCallback,
    /// (label, value)
    pub info_row: StrPairCallback,
    pub info_table_end: VoidCallback,
    pub display_ini_entries: VoidCallback,
    /// Visible warning channel: (level, message)
    pub warning: Option<extern "C" fn(*mut c_void, c_int, *const c_char)>,
}

fn to_cstring(s: &str) -> CString {
    // Interior NULs cannot cross the boundary; cut at the first one
    let bytes = s.as_bytes();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    CString::new(&bytes[..end]).unwrap_or_default()
}

/// [`HostBindings`] over a callback table
struct CallbackHost<'a> {
    callbacks: &'a FfmHostCallbacks,
}

impl CallbackHost<'_> {
    fn str_pair(&self, cb: StrPairCallback, a: &str, b: &str) {
        if let Some(cb) = cb {
            let (a, b) = (to_cstring(a), to_cstring(b));
            cb(self.callbacks.user_data, a.as_ptr(), b.as_ptr());
        }
    }

    fn void(&self, cb: VoidCallback) {
        if let Some(cb) = cb {
            cb(self.callbacks.user_data);
        }
    }
}

impl HostBindings for CallbackHost<'_> {
    fn register_ini_entries(&mut self, entries: &[IniEntry]) {
        for entry in entries {
            self.str_pair(self.callbacks.register_ini_entry, entry.name, entry.default);
        }
    }

    fn unregister_ini_entries(&mut self) {
        self.void(self.callbacks.unregister_ini_entries);
    }

    fn register_class(&mut self, name: &str) {
        if let Some(cb) = self.callbacks.register_class {
            let name = to_cstring(name);
            cb(self.callbacks.user_data, name.as_ptr());
        }
    }

    fn register_constant(&mut self, name: &str, value: ConstantValue) {
        match value {
            ConstantValue::Str(s) => {
                self.str_pair(self.callbacks.register_string_constant, name, &s)
            }
            ConstantValue::Long(v) => {
                if let Some(cb) = self.callbacks.register_long_constant {
                    let name = to_cstring(name);
                    cb(self.callbacks.user_data, name.as_ptr(), v);
                }
            }
        }
    }

    fn info_table_start(&mut self) {
        self.void(self.callbacks.info_table_start);
    }

    fn info_row(&mut self, label: &str, value: &str) {
        self.str_pair(self.callbacks.info_row, label, value);
    }

    fn info_table_end(&mut self) {
        self.void(self.callbacks.info_table_end);
    }

    fn display_ini_entries(&mut self) {
        self.void(self.callbacks.display_ini_entries);
    }
}

/// Host warning channel as a [`DiagnosticSink`]
struct CallbackSink {
    user_data: *mut c_void,
    warning: extern "C" fn(*mut c_void, c_int, *const c_char),
}

// The host guarantees its warning callback may be invoked from any thread
unsafe impl Send for CallbackSink {}
unsafe impl Sync for CallbackSink {}

impl DiagnosticSink for CallbackSink {
    fn forward(&self, event: &NativeLogEvent) {
        let message = to_cstring(&event.message);
        (self.warning)(self.user_data, event.level, message.as_ptr());
    }
}

fn sink_for(callbacks: &FfmHostCallbacks) -> Box<dyn DiagnosticSink> {
    match callbacks.warning {
        Some(warning) => Box::new(CallbackSink {
            user_data: callbacks.user_data,
            warning,
        }),
        None => Box::new(LogCrateSink),
    }
}

/// Read an optional C string; null and invalid UTF-8 read as `None`
unsafe fn opt_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s).to_str().ok() }
}

// =============================================================================
// Error Handling
// =============================================================================

/// Get last error message
#[no_mangle]
pub extern "C" fn ffm_get_last_error() -> *const c_char {
    LAST_ERROR.with(|e| e.borrow().as_ref().map(|s| s.as_ptr()).unwrap_or(ptr::null()))
}

/// Clear last error
#[no_mangle]
pub extern "C" fn ffm_clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Set up Rust-side logging. Optional; call before startup.
#[no_mangle]
pub extern "C" fn ffm_init_logging() {
    crate::init_logging();
}

// =============================================================================
// Module Lifecycle
// =============================================================================

/// Start the module.
///
/// `show_warnings` and `allow_persistent` are the raw INI values; null
/// selects the default. Repeated calls while started are no-ops. After a
/// failed startup the next call starts over with its own values.
#[no_mangle]
pub extern "C" fn ffm_module_startup(
    callbacks: *const FfmHostCallbacks,
    show_warnings: *const c_char,
    allow_persistent: *const c_char,
) -> FfmResult {
    if callbacks.is_null() {
        set_last_error("Host callbacks are null");
        return FfmResult::ErrorInvalidArgument;
    }
    let callbacks = unsafe { &*callbacks };

    let entries = unsafe {
        [
            (SHOW_WARNINGS_KEY, opt_str(show_warnings)),
            (ALLOW_PERSISTENT_KEY, opt_str(allow_persistent)),
        ]
    };
    let config = ModuleConfig::from_entries(
        entries
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v))),
    );

    let module = module_for_startup(&mut MODULE.lock(), || FfmpegModule::new(config));
    let mut host = CallbackHost { callbacks };
    module.startup_with_sink(&mut host, sink_for(callbacks)).into()
}

/// Stop the module
#[no_mangle]
pub extern "C" fn ffm_module_shutdown(callbacks: *const FfmHostCallbacks) -> FfmResult {
    if callbacks.is_null() {
        set_last_error("Host callbacks are null");
        return FfmResult::ErrorInvalidArgument;
    }
    let callbacks = unsafe { &*callbacks };

    match current_module() {
        Some(module) => {
            module.shutdown(&mut CallbackHost { callbacks });
            FfmResult::Success
        }
        None => FfmResult::Success,
    }
}

/// Check if the module is started
#[no_mangle]
pub extern "C" fn ffm_module_is_initialized() -> bool {
    current_module()
        .map(|m| m.state() == LibraryState::Initialized)
        .unwrap_or(false)
}

/// Render the module's info page section
#[no_mangle]
pub extern "C" fn ffm_module_info(callbacks: *const FfmHostCallbacks) -> FfmResult {
    if callbacks.is_null() {
        set_last_error("Host callbacks are null");
        return FfmResult::ErrorInvalidArgument;
    }
    let callbacks = unsafe { &*callbacks };

    match current_module() {
        Some(module) => module.info(&mut CallbackHost { callbacks }).into(),
        None => Error::NotInitialized.into(),
    }
}

// =============================================================================
// Codec List
// =============================================================================

/// Codec listing, or null on failure. Free with `ffm_string_free`.
#[no_mangle]
pub extern "C" fn ffm_codec_list() -> *mut c_char {
    let report = match current_module() {
        Some(module) => module.codec_report(),
        None => Err(Error::NotInitialized),
    };

    match report {
        Ok(report) => report.as_c_str().to_owned().into_raw(),
        Err(e) => {
            log::error!("FFI::ffm_codec_list - error: {}", e);
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Release a string returned by this library
#[no_mangle]
pub extern "C" fn ffm_string_free(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            drop(CString::from_raw(s));
        }
    }
}

// =============================================================================
// Version Info
// =============================================================================

static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
static BUILD_DATE: &str = concat!(env!("FFMPEG_MODULE_BUILD_DATE"), "\0");

/// Get library version
#[no_mangle]
pub extern "C" fn ffm_get_version() -> *const c_char {
    VERSION.as_ptr() as *const c_char
}

/// Get build timestamp
#[no_mangle]
pub extern "C" fn ffm_get_build_date() -> *const c_char {
    BUILD_DATE.as_ptr() as *const c_char
}

/// Get libavcodec version as `AV_VERSION_INT`
#[no_mangle]
pub extern "C" fn ffm_get_avcodec_version() -> u32 {
    ffmpeg_next::codec::version()
}
