//! Build script for ffmpeg-module-core
//!
//! This script:
//! 1. Locates FFmpeg libraries using pkg-config
//! 2. Stamps the build timestamp exported to the host
//! 3. Generates the C header using cbindgen

use std::env;
use std::path::{Path, PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    // Get build configuration
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");

    // Find FFmpeg libraries
    find_ffmpeg_libs();

    // Build timestamp
    emit_build_date();

    // Generate C header
    generate_header(&manifest_dir, &out_dir);
}

/// Find FFmpeg libraries using pkg-config or fallback paths
fn find_ffmpeg_libs() {
    let mut libs = vec!["libavcodec", "libavformat", "libavutil"];
    if env::var_os("CARGO_FEATURE_SWSCALE").is_some() {
        libs.push("libswscale");
    }

    let mut found_all = true;
    for lib in &libs {
        match pkg_config::Config::new()
            .atleast_version("58.0.0") // FFmpeg 6.0+
            .probe(lib)
        {
            Ok(library) => {
                println!("cargo:info=Found {} via pkg-config", lib);
                for path in &library.link_paths {
                    println!("cargo:rustc-link-search=native={}", path.display());
                }
            }
            Err(e) => {
                println!("cargo:warning=pkg-config failed for {}: {}", lib, e);
                found_all = false;
            }
        }
    }

    if !found_all {
        try_fallback_paths(&libs);
    }
}

/// Try common FFmpeg installation paths
fn try_fallback_paths(libs: &[&str]) {
    let lib_paths = [
        // Apple Silicon Homebrew
        "/opt/homebrew/opt/ffmpeg/lib",
        "/opt/homebrew/lib",
        // Intel Homebrew
        "/usr/local/opt/ffmpeg/lib",
        "/usr/local/lib",
        // Distribution packages
        "/usr/lib/x86_64-linux-gnu",
        "/usr/lib64",
    ];

    for path in &lib_paths {
        if Path::new(path).exists() {
            println!("cargo:rustc-link-search=native={}", path);
            println!("cargo:info=Added link path: {}", path);
        }
    }

    // Link FFmpeg libraries dynamically
    for lib in libs {
        println!("cargo:rustc-link-lib=dylib={}", lib.trim_start_matches("lib"));
    }
}

/// Stamp FFMPEG_MODULE_BUILD_DATE as "Mon DD YYYY HH:MM:SS"
fn emit_build_date() {
    use chrono::{DateTime, Utc};

    let now = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    println!(
        "cargo:rustc-env=FFMPEG_MODULE_BUILD_DATE={}",
        now.format("%b %e %Y %H:%M:%S")
    );
}

/// Generate C header using cbindgen
fn generate_header(manifest_dir: &str, out_dir: &str) {
    let crate_dir = PathBuf::from(manifest_dir);
    let config_path = crate_dir.join("cbindgen.toml");
    let header_out = PathBuf::from(out_dir).join("ffmpeg_module.h");

    // Load cbindgen config
    let config = if config_path.exists() {
        cbindgen::Config::from_file(&config_path).unwrap_or_default()
    } else {
        let mut config = cbindgen::Config::default();
        config.language = cbindgen::Language::C;
        config.include_guard = Some("FFMPEG_MODULE_H".to_string());
        config
    };

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&header_out);
            println!("cargo:info=Generated header: {}", header_out.display());
        }
        Err(e) => {
            println!("cargo:warning=cbindgen failed: {}", e);
            create_fallback_header(out_dir);
        }
    }
}

/// Create a minimal fallback header if cbindgen fails
fn create_fallback_header(out_dir: &str) {
    let header_content = r#"
#ifndef FFMPEG_MODULE_H
#define FFMPEG_MODULE_H

#include <stdint.h>
#include <stdbool.h>

// Note: This is a fallback header. Build with cbindgen for full API.

typedef enum {
    FfmResultSuccess = 0,
    FfmResultErrorLifecycle = 1,
    FfmResultErrorNotInitialized = 2,
    FfmResultErrorMemory = 3,
    FfmResultErrorConfiguration = 4,
    FfmResultErrorFFmpeg = 5,
    FfmResultErrorInvalidArgument = 6,
} FfmResult;

typedef struct {
    void *user_data;
    void (*register_ini_entry)(void *, const char *name, const char *default_value);
    void (*unregister_ini_entries)(void *);
    void (*register_class)(void *, const char *name);
    void (*register_string_constant)(void *, const char *name, const char *value);
    void (*register_long_constant)(void *, const char *name, int64_t value);
    void (*info_table_start)(void *);
    void (*info_row)(void *, const char *label, const char *value);
    void (*info_table_end)(void *);
    void (*display_ini_entries)(void *);
    void (*warning)(void *, int level, const char *message);
} FfmHostCallbacks;

// Error handling
const char* ffm_get_last_error(void);
void ffm_clear_last_error(void);
void ffm_init_logging(void);

// Module lifecycle
FfmResult ffm_module_startup(const FfmHostCallbacks *callbacks,
                             const char *show_warnings, const char *allow_persistent);
FfmResult ffm_module_shutdown(const FfmHostCallbacks *callbacks);
bool ffm_module_is_initialized(void);
FfmResult ffm_module_info(const FfmHostCallbacks *callbacks);

// Codec list
char* ffm_codec_list(void);
void ffm_string_free(char *s);

// Version info
const char* ffm_get_version(void);
const char* ffm_get_build_date(void);
uint32_t ffm_get_avcodec_version(void);

#endif // FFMPEG_MODULE_H
"#;

    let header_path = PathBuf::from(out_dir).join("ffmpeg_module.h");
    std::fs::write(&header_path, header_content).expect("Failed to write fallback header");
    println!("cargo:info=Created fallback header: {}", header_path.display());
}
