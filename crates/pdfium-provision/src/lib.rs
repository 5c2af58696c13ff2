//! # pdfium-provision
//!
//! Make a PDFium shared library available to [`pdfium_render`] without any
//! manual setup.
//!
//! Resolution order, first match wins:
//!
//! 1. `PDFIUM_LIB_PATH` names an existing library file.
//! 2. The per-version cache directory already holds the platform library.
//! 3. The platform archive is downloaded from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries),
//!    the library member is unpacked into the cache, and that path is used.
//!
//! ```rust,no_run
//! use pdfium_provision::Provisioner;
//!
//! let pdfium = Provisioner::from_env().bind(None).expect("pdfium unavailable");
//! ```
//!
//! ## Environment variables
//!
//! - `PDFIUM_LIB_PATH`: existing pdfium library; skips the cache and network.
//! - `PDFIUM_PROVISION_CACHE_DIR`: cache root (default: the platform cache
//!   directory joined with `pdf2txt`).

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, info, warn};

/// pdfium-binaries release tag (`chromium/<VERSION>`).
pub const PDFIUM_VERSION: &str = "7690";

/// Explicit library path override.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Cache root override.
pub const CACHE_DIR_ENV: &str = "PDFIUM_PROVISION_CACHE_DIR";

const RELEASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";
const CACHE_NAMESPACE: &str = "pdf2txt";
const CHUNK_SIZE: usize = 64 * 1024;

/// Download progress sink: `(bytes_so_far, total_bytes_if_known)`.
pub type ProgressFn<'a> = &'a dyn Fn(u64, Option<u64>);

/// Errors raised while locating, fetching, or binding pdfium.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// No pdfium build is published for this OS/architecture.
    #[error("No pdfium build is published for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// The cache directory could not be created.
    #[error("Cannot prepare cache directory '{path}': {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network request failed or returned a non-success status.
    #[error("Download of '{url}' failed: {reason}")]
    Download { url: String, reason: String },

    /// The archive was read but the library member was absent.
    #[error("Archive does not contain '{member}'")]
    MissingMember { member: String },

    /// gzip/tar decoding or unpacking failed.
    #[error("Archive extraction failed: {0}")]
    Extract(#[source] std::io::Error),

    /// The library file exists but could not be loaded.
    #[error("Failed to bind pdfium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}

// ── Platform table ───────────────────────────────────────────────────────────

/// A published pdfium build for one OS/architecture pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Release asset name, e.g. `pdfium-linux-x64.tgz`.
    pub archive: &'static str,
    /// Library path inside the archive, e.g. `lib/libpdfium.so`.
    pub member: &'static str,
}

impl Platform {
    /// Look up the build for an `std::env::consts::{OS, ARCH}` pair.
    pub fn lookup(os: &str, arch: &str) -> Result<Self, ProvisionError> {
        let (archive, member) = match (os, arch) {
            ("macos", "aarch64") => ("pdfium-mac-arm64.tgz", "lib/libpdfium.dylib"),
            ("macos", "x86_64") => ("pdfium-mac-x64.tgz", "lib/libpdfium.dylib"),
            ("linux", "x86_64") => ("pdfium-linux-x64.tgz", "lib/libpdfium.so"),
            ("linux", "aarch64") => ("pdfium-linux-arm64.tgz", "lib/libpdfium.so"),
            ("windows", "x86_64") => ("pdfium-win-x64.tgz", "bin/pdfium.dll"),
            ("windows", "aarch64") => ("pdfium-win-arm64.tgz", "bin/pdfium.dll"),
            ("windows", "x86") => ("pdfium-win-x86.tgz", "bin/pdfium.dll"),
            _ => {
                return Err(ProvisionError::UnsupportedPlatform {
                    os: os.to_string(),
                    arch: arch.to_string(),
                })
            }
        };
        Ok(Self { archive, member })
    }

    /// The build for the running process.
    pub fn current() -> Result<Self, ProvisionError> {
        Self::lookup(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// File name the library is stored under in the cache.
    pub fn lib_name(&self) -> &'static str {
        self.member.rsplit('/').next().unwrap_or(self.member)
    }

    fn download_url(&self, version: &str) -> String {
        format!("{RELEASE_URL}/chromium%2F{version}/{}", self.archive)
    }
}

// ── Provisioner ──────────────────────────────────────────────────────────────

/// Resolves a pdfium library path for a given cache root and release.
#[derive(Debug, Clone)]
pub struct Provisioner {
    cache_root: PathBuf,
    version: String,
    lib_override: Option<PathBuf>,
}

impl Provisioner {
    /// Provisioner rooted at `cache_root`, with no library override.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            version: PDFIUM_VERSION.to_string(),
            lib_override: None,
        }
    }

    /// Provisioner configured from `PDFIUM_LIB_PATH` and
    /// `PDFIUM_PROVISION_CACHE_DIR`.
    pub fn from_env() -> Self {
        let cache_root = std::env::var_os(CACHE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_root);
        let mut provisioner = Self::new(cache_root);
        provisioner.lib_override = std::env::var_os(LIB_PATH_ENV).map(PathBuf::from);
        provisioner
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_library_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.lib_override = Some(path.into());
        self
    }

    /// `<cache_root>/pdfium-<version>`.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_root.join(format!("pdfium-{}", self.version))
    }

    /// Library path if it is already on disk; never touches the network.
    pub fn cached_library(&self) -> Option<PathBuf> {
        if let Some(path) = self.lib_override.as_ref().filter(|p| p.exists()) {
            return Some(path.clone());
        }
        let platform = Platform::current().ok()?;
        let path = self.cache_dir().join(platform.lib_name());
        path.exists().then_some(path)
    }

    pub fn is_cached(&self) -> bool {
        self.cached_library().is_some()
    }

    /// Return a usable library path, downloading into the cache if needed.
    pub fn ensure(&self, on_progress: Option<ProgressFn<'_>>) -> Result<PathBuf, ProvisionError> {
        if let Some(path) = &self.lib_override {
            if path.exists() {
                debug!("Using pdfium from {}: {}", LIB_PATH_ENV, path.display());
                return Ok(path.clone());
            }
            warn!(
                "{} points at missing file '{}'; falling back to the cache",
                LIB_PATH_ENV,
                path.display()
            );
        }

        let platform = Platform::current()?;
        let dir = self.cache_dir();
        let lib_path = dir.join(platform.lib_name());
        if lib_path.exists() {
            debug!("Using cached pdfium: {}", lib_path.display());
            return Ok(lib_path);
        }

        std::fs::create_dir_all(&dir).map_err(|source| ProvisionError::CacheDir {
            path: dir.clone(),
            source,
        })?;

        let url = platform.download_url(&self.version);
        info!("Downloading pdfium {} from {}", self.version, url);
        let archive = fetch(&url, on_progress)?;
        unpack_member(&archive, platform.member, &lib_path)?;
        info!("pdfium cached at {}", lib_path.display());

        Ok(lib_path)
    }

    /// [`Self::ensure`] followed by [`bind_library`].
    pub fn bind(&self, on_progress: Option<ProgressFn<'_>>) -> Result<Pdfium, ProvisionError> {
        let path = self.ensure(on_progress)?;
        bind_library(&path)
    }
}

fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir)
        .join(CACHE_NAMESPACE)
}

// ── Process-wide helpers ─────────────────────────────────────────────────────

static RESOLVED: OnceLock<PathBuf> = OnceLock::new();

/// `true` when no download would be needed for the environment-configured
/// provisioner.
pub fn is_pdfium_cached() -> bool {
    RESOLVED.get().is_some() || Provisioner::from_env().is_cached()
}

/// Resolve the library once per process using [`Provisioner::from_env`].
pub fn ensure_pdfium_library(
    on_progress: Option<ProgressFn<'_>>,
) -> Result<PathBuf, ProvisionError> {
    if let Some(path) = RESOLVED.get() {
        return Ok(path.clone());
    }
    let path = Provisioner::from_env().ensure(on_progress)?;
    Ok(RESOLVED.get_or_init(|| path).clone())
}

/// Resolve (see [`ensure_pdfium_library`]) and bind.
pub fn bind_pdfium(on_progress: Option<ProgressFn<'_>>) -> Result<Pdfium, ProvisionError> {
    let path = ensure_pdfium_library(on_progress)?;
    bind_library(&path)
}

/// Load the pdfium library at `path`.
pub fn bind_library(path: &Path) -> Result<Pdfium, ProvisionError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| ProvisionError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

// ── Download / unpack ────────────────────────────────────────────────────────

fn fetch(url: &str, on_progress: Option<ProgressFn<'_>>) -> Result<Vec<u8>, ProvisionError> {
    let download_err = |reason: String| ProvisionError::Download {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-provision/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| download_err(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| download_err(e.to_string()))?;

    if !response.status().is_success() {
        return Err(download_err(format!("HTTP {}", response.status())));
    }

    let total = response.content_length();
    let mut body = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(download_err(e.to_string())),
        };
        body.extend_from_slice(&chunk[..n]);
        if let Some(cb) = on_progress {
            cb(body.len() as u64, total);
        }
    }

    Ok(body)
}

/// Unpack `member` from a `.tgz` into `dest`.
///
/// The member is written beside `dest` first and renamed into place, so an
/// interrupted unpack never leaves a truncated library at the cached path.
fn unpack_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), ProvisionError> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let mut archive = Archive::new(GzDecoder::new(archive));
    for entry in archive.entries().map_err(ProvisionError::Extract)? {
        let mut entry = entry.map_err(ProvisionError::Extract)?;
        let is_member = entry
            .path()
            .map_err(ProvisionError::Extract)?
            .to_string_lossy()
            .trim_start_matches("./")
            == member;
        if !is_member {
            continue;
        }

        let staging = dest.with_extension("partial");
        entry.unpack(&staging).map_err(ProvisionError::Extract)?;
        std::fs::rename(&staging, dest).map_err(ProvisionError::Extract)?;
        return Ok(());
    }

    Err(ProvisionError::MissingMember {
        member: member.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn tgz_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::fast()));
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn lookup_known_platforms() {
        let linux = Platform::lookup("linux", "x86_64").unwrap();
        assert_eq!(linux.archive, "pdfium-linux-x64.tgz");
        assert_eq!(linux.lib_name(), "libpdfium.so");

        let win = Platform::lookup("windows", "x86").unwrap();
        assert_eq!(win.lib_name(), "pdfium.dll");

        let mac = Platform::lookup("macos", "aarch64").unwrap();
        assert_eq!(mac.member, "lib/libpdfium.dylib");
    }

    #[test]
    fn lookup_unknown_platform_fails() {
        let err = Platform::lookup("plan9", "mips").unwrap_err();
        assert!(err.to_string().contains("plan9/mips"), "got: {err}");
    }

    #[test]
    fn download_url_embeds_version_and_asset() {
        let p = Platform::lookup("linux", "aarch64").unwrap();
        let url = p.download_url("1234");
        assert!(url.ends_with("/chromium%2F1234/pdfium-linux-arm64.tgz"), "{url}");
    }

    #[test]
    fn cache_dir_is_versioned_under_root() {
        let prov = Provisioner::new("/tmp/root").with_version("42");
        assert_eq!(prov.cache_dir(), PathBuf::from("/tmp/root/pdfium-42"));
    }

    #[test]
    fn existing_override_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("libpdfium-test.so");
        std::fs::write(&lib, b"not really a library").unwrap();

        let prov = Provisioner::new(dir.path().join("cache")).with_library_override(&lib);
        assert_eq!(prov.cached_library(), Some(lib.clone()));
        assert_eq!(prov.ensure(None).unwrap(), lib);
        assert!(!prov.cache_dir().exists(), "no cache dir should be created");
    }

    #[test]
    fn empty_cache_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let prov = Provisioner::new(dir.path());
        assert!(!prov.is_cached());
    }

    #[test]
    fn unpack_member_writes_library() {
        let archive = tgz_with(&[
            ("include/fpdfview.h", b"// header"),
            ("lib/libpdfium.so", b"ELF-ish bytes"),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("libpdfium.so");

        unpack_member(&archive, "lib/libpdfium.so", &dest).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"ELF-ish bytes");
        assert!(!dest.with_extension("partial").exists());
    }

    #[test]
    fn unpack_member_reports_missing_member() {
        let archive = tgz_with(&[("README", b"nothing here")]);
        let dir = tempfile::tempdir().unwrap();
        let err = unpack_member(&archive, "lib/libpdfium.so", &dir.path().join("x")).unwrap_err();
        assert!(matches!(err, ProvisionError::MissingMember { .. }));
    }
}
