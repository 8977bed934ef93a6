//! Key files on disk
//!
//! A bundle is committed in two phases: all four artifacts are written and
//! synced into a private staging directory inside the output directory, then
//! renamed into place. A failure before the renames leaves the output
//! directory as it was; the staging directory is removed on every path.
//!
//! The renames themselves are not atomic as a group. They run in
//! [`KEY_FILES`] order with `secret_key.k` last, so an interrupted commit
//! never pairs a new secret key with old public material; the key id in every
//! header makes the partial state detectable on load.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::bfv::{PublicKey, SecretKey};
use crate::error::{Error, Result};
use crate::ks::{GaloisKeys, RelinKeys};
use crate::math::GaussianSampler;
use crate::params::SchemeParameters;
use crate::serialize::{from_bytes, to_bytes, Artifact};

use super::bundle::KeyBundle;

pub const SECRET_KEY_FILE: &str = "secret_key.k";
pub const PUBLIC_KEY_FILE: &str = "public_key.k";
pub const RELIN_KEYS_FILE: &str = "relin_keys.k";
pub const GALOIS_KEYS_FILE: &str = "gal_keys.k";

/// All artifact file names, in commit order; the secret key goes last
pub const KEY_FILES: [&str; 4] = [PUBLIC_KEY_FILE, RELIN_KEYS_FILE, GALOIS_KEYS_FILE, SECRET_KEY_FILE];

const STAGING_PREFIX: &str = ".hescore-staging-";

/// Generate a fresh bundle for `ring_degree` and persist it into `output_dir`.
///
/// An unsupported degree fails with [`Error::InvalidParameters`] before the
/// file system is touched.
pub fn generate(output_dir: &Path, ring_degree: usize) -> Result<KeyBundle> {
    let params = SchemeParameters::for_degree(ring_degree)?;
    params.validate()?;

    info!(dir = %output_dir.display(), ring_degree, "generating keys");
    let mut sampler = GaussianSampler::from_entropy(params.sigma);
    let bundle = KeyBundle::generate(&params, &mut sampler)?;
    bundle.save(output_dir)?;
    Ok(bundle)
}

impl KeyBundle {
    /// Write the four key files into `dir` with stage-then-commit.
    ///
    /// Existing key files of an earlier run are replaced. Only staging is
    /// all-or-nothing: if a rename fails, the files already renamed are new
    /// and the rest, including `secret_key.k`, still belong to the old run.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let artifacts = self.artifact_bytes()?;

        fs::create_dir_all(dir)?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(dir)?;

        for (name, bytes) in &artifacts {
            write_synced(&staging.path().join(name), bytes, *name == SECRET_KEY_FILE)?;
            debug!(file = name, bytes = bytes.len(), "staged");
        }
        for (name, _) in &artifacts {
            fs::rename(staging.path().join(name), dir.join(name))?;
            debug!(file = name, "committed");
        }
        sync_dir(dir)?;
        staging.close()?;

        info!(dir = %dir.display(), key_id = %self.key_id, "key bundle committed");
        Ok(())
    }

    /// Serialized artifacts paired with their file names, in [`KEY_FILES`] order
    fn artifact_bytes(&self) -> Result<[(&'static str, Vec<u8>); 4]> {
        Ok([
            (PUBLIC_KEY_FILE, to_bytes(&self.public_key, &self.params)?),
            (RELIN_KEYS_FILE, to_bytes(&self.relin_keys, &self.params)?),
            (GALOIS_KEYS_FILE, to_bytes(&self.galois_keys, &self.params)?),
            (SECRET_KEY_FILE, to_bytes(&self.secret_key, &self.params)?),
        ])
    }

    /// Load all four artifacts from `dir`.
    ///
    /// Files from different generation runs are rejected with
    /// [`Error::KeyLoad`].
    pub fn load(dir: &Path, params: &SchemeParameters) -> Result<Self> {
        let secret_key = load_secret_key(dir, params)?;
        let public_key = load_public_key(dir, params)?;
        let relin_keys = load_relin_keys(dir, params)?;
        let galois_keys = load_galois_keys(dir, params)?;

        let key_id = secret_key.key_id;
        let foreign = [
            (PUBLIC_KEY_FILE, public_key.key_id),
            (RELIN_KEYS_FILE, relin_keys.key_id),
            (GALOIS_KEYS_FILE, galois_keys.key_id),
        ]
        .into_iter()
        .find(|(_, id)| *id != key_id);
        if let Some((name, id)) = foreign {
            return Err(Error::KeyLoad(format!(
                "mixed key bundle in {}: {name} belongs to {id}, {SECRET_KEY_FILE} to {key_id}",
                dir.display()
            )));
        }

        Ok(Self {
            params: params.clone(),
            key_id,
            secret_key,
            public_key,
            relin_keys,
            galois_keys,
        })
    }
}

fn write_synced(path: &Path, bytes: &[u8], private: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    if private {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = private;

    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })
}

fn load_file<A: Artifact>(dir: &Path, name: &str, params: &SchemeParameters) -> Result<A> {
    let bytes = read_artifact(&dir.join(name))?;
    from_bytes(&bytes, params)
}

/// Load `public_key.k` from `dir`.
///
/// [`Error::FileNotFound`] if absent, [`Error::Deserialization`] if malformed
/// or produced under another profile.
pub fn load_public_key(dir: &Path, params: &SchemeParameters) -> Result<PublicKey> {
    load_file(dir, PUBLIC_KEY_FILE, params)
}

pub fn load_secret_key(dir: &Path, params: &SchemeParameters) -> Result<SecretKey> {
    load_file(dir, SECRET_KEY_FILE, params)
}

/// Parse secret key bytes already held in memory
pub fn load_secret_key_from_bytes(bytes: &[u8], params: &SchemeParameters) -> Result<SecretKey> {
    from_bytes(bytes, params)
}

pub fn load_relin_keys(dir: &Path, params: &SchemeParameters) -> Result<RelinKeys> {
    load_file(dir, RELIN_KEYS_FILE, params)
}

pub fn load_galois_keys(dir: &Path, params: &SchemeParameters) -> Result<GaloisKeys> {
    load_file(dir, GALOIS_KEYS_FILE, params)
}
