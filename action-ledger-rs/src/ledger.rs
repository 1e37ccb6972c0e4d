// action-ledger-rs/src/ledger.rs
// File-backed ledger: encrypted frames, SHA-256 chain, single-write appends.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::sync::Mutex;

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::ActionLedgerConfig;
use crate::error::LedgerError;
use crate::{AuditEntry, AuditSink};

/// On-disk representation of a single encrypted entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerFileEntry {
    /// SHA-256(prev_hash || ciphertext).
    hash_chain: [u8; 32],
    /// Random 96-bit nonce for AES-GCM.
    nonce: [u8; 12],
    /// Encrypted bytes of the bincode-encoded `AuditEntry`.
    ciphertext: Vec<u8>,
}

/// Append-only audit ledger backed by a single file.
pub struct ActionLedger {
    cfg: ActionLedgerConfig,
    cipher: Aes256Gcm,
    /// Last hash in the chain (all zeros for an empty file). Held for the
    /// whole append so file order and chain order agree.
    last_hash: Mutex<[u8; 32]>,
}

impl ActionLedger {
    /// Opens (or creates) the ledger, verifying the existing chain and
    /// that every entry decrypts with the configured key.
    pub fn open(cfg: ActionLedgerConfig) -> Result<Self, LedgerError> {
        if let Some(parent) = cfg.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&cfg.key));
        let chain = read_chain(&cfg.path, &cipher)?;
        if let Some(torn) = chain.torn_bytes {
            log::warn!(
                "audit ledger {} ends in a torn frame; dropping its {} bytes",
                cfg.path.display(),
                torn
            );
            OpenOptions::new().write(true).open(&cfg.path)?.set_len(chain.valid_len)?;
        }
        let Chain { entries, last_hash, .. } = chain;
        log::info!(
            "audit ledger opened at {} with {} entries",
            cfg.path.display(),
            entries.len()
        );

        Ok(Self {
            cfg,
            cipher,
            last_hash: Mutex::new(last_hash),
        })
    }

    pub fn path(&self) -> &Path {
        &self.cfg.path
    }

    fn encode_frame(&self, entry: &AuditEntry, prev: &[u8; 32]) -> Result<(Vec<u8>, [u8; 32]), LedgerError> {
        let plaintext = bincode::serialize(entry)?;

        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_ref())
            .map_err(|e| LedgerError::Crypto(format!("encrypt failed: {e}")))?;

        let hash_chain = chain_hash(prev, &ciphertext);
        let encoded = bincode::serialize(&LedgerFileEntry {
            hash_chain,
            nonce: nonce_bytes,
            ciphertext,
        })?;

        let len = u32::try_from(encoded.len())
            .map_err(|_| LedgerError::Corrupted(format!("entry of {} bytes is too large", encoded.len())))?;
        let mut frame = Vec::with_capacity(4 + encoded.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&encoded);
        Ok((frame, hash_chain))
    }
}

impl AuditSink for ActionLedger {
    fn append(&self, entry: &AuditEntry) -> Result<(), LedgerError> {
        let mut last = self.last_hash.lock().map_err(|_| LedgerError::Poisoned)?;
        let (frame, new_hash) = self.encode_frame(entry, &last)?;

        let mut file = OpenOptions::new().create(true).append(true).open(self.path())?;
        let committed = file.metadata()?.len();
        // Length prefix and body go out in one write.
        if let Err(e) = file.write_all(&frame).and_then(|()| file.flush()) {
            // Cut the partial frame so the next append starts on a frame boundary.
            if let Err(trim) = file.set_len(committed) {
                log::error!("could not trim partial audit frame: {}", trim);
            }
            return Err(e.into());
        }

        *last = new_hash;
        log::debug!("audit entry appended for request {}", entry.request_id());
        Ok(())
    }

    fn records(&self) -> Result<Vec<AuditEntry>, LedgerError> {
        // Holding the lock keeps readers from seeing a half-written frame.
        let _guard = self.last_hash.lock().map_err(|_| LedgerError::Poisoned)?;
        Ok(read_chain(self.path(), &self.cipher)?.entries)
    }
}

fn chain_hash(prev: &[u8; 32], ciphertext: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(prev);
    hasher.update(ciphertext);
    hasher.finalize().into()
}

/// Contents of a ledger file up to its last complete frame.
struct Chain {
    entries: Vec<AuditEntry>,
    last_hash: [u8; 32],
    /// Byte length of the complete frames.
    valid_len: u64,
    /// Size of an incomplete trailing frame, if the last write was cut short.
    torn_bytes: Option<usize>,
}

/// Reads every frame, checking chain continuity and decrypting each entry.
/// A missing file is an empty ledger with the zero hash as its head. An
/// incomplete frame at the very end is reported, not treated as corruption.
fn read_chain(path: &Path, cipher: &Aes256Gcm) -> Result<Chain, LedgerError> {
    let mut buf = Vec::new();
    let mut chain = Chain {
        entries: Vec::new(),
        last_hash: [0u8; 32],
        valid_len: 0,
        torn_bytes: None,
    };
    match OpenOptions::new().read(true).open(path) {
        Ok(mut file) => {
            file.read_to_end(&mut buf)?;
        }
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(chain),
        Err(e) => return Err(e.into()),
    }

    let mut cursor = 0usize;
    while cursor < buf.len() {
        let frame_bytes = buf.get(cursor..cursor + 4).and_then(|prefix| {
            let len = u32::from_le_bytes(prefix.try_into().ok()?) as usize;
            buf.get(cursor + 4..cursor + 4 + len)
        });
        let Some(slice) = frame_bytes else {
            chain.torn_bytes = Some(buf.len() - cursor);
            break;
        };

        let frame: LedgerFileEntry = bincode::deserialize(slice)?;
        if frame.hash_chain != chain_hash(&chain.last_hash, &frame.ciphertext) {
            return Err(LedgerError::Corrupted(format!(
                "hash chain mismatch at entry {}; possible tampering",
                chain.entries.len()
            )));
        }

        let plaintext = cipher
            .decrypt(Nonce::from_slice(&frame.nonce), frame.ciphertext.as_ref())
            .map_err(|e| LedgerError::Crypto(format!("decrypt failed: {e}")))?;
        chain.entries.push(bincode::deserialize(&plaintext)?);

        chain.last_hash = frame.hash_chain;
        cursor += 4 + slice.len();
        chain.valid_len = cursor as u64;
    }

    Ok(chain)
}
