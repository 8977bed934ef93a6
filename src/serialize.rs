//! Self-describing binary artifacts
//!
//! Every key file and every ciphertext on the wire is a fixed 64-byte header
//! followed by a body:
//!
//! ```text
//! offset  size  field
//!      0     4  magic "HESC"
//!      4     2  format version (u16 LE)
//!      6     1  artifact kind
//!      7     1  body encoding
//!      8    16  profile fingerprint
//!     24    16  key id
//!     40     8  body length (u64 LE)
//!     48    16  body digest (SHA-256, truncated)
//!     64     *  body
//! ```
//!
//! Loading checks magic, version, kind, profile fingerprint, exact length and
//! body digest before the body is decoded, so bytes from another profile,
//! another artifact type or a damaged transfer fail with
//! [`Error::Deserialization`] instead of decoding into garbage.

use std::fmt;
use std::io::{Cursor, Read, Write};

use bincode::Options;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::bfv::{Ciphertext, KeyId, PublicKey, SecretKey};
use crate::error::{de_err, Error, Result};
use crate::ks::{GaloisKeys, RelinKeys};
use crate::math::{ModQ, Poly};
use crate::params::{Fingerprint, SchemeParameters};

pub const MAGIC: [u8; 4] = *b"HESC";
pub const FORMAT_VERSION: u16 = 2;
pub const HEADER_LEN: usize = 64;

/// Leading 16 bytes of the SHA-256 of an artifact body
pub type BodyDigest = [u8; 16];

/// Digest stored in the header for `body`
pub fn body_digest(body: &[u8]) -> BodyDigest {
    let digest = Sha256::digest(body);
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    out
}

/// What an artifact contains
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ArtifactKind {
    SecretKey = 1,
    PublicKey = 2,
    RelinKeys = 3,
    GaloisKeys = 4,
    Ciphertext = 5,
}

impl ArtifactKind {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::SecretKey),
            2 => Some(Self::PublicKey),
            3 => Some(Self::RelinKeys),
            4 => Some(Self::GaloisKeys),
            5 => Some(Self::Ciphertext),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SecretKey => "secret key",
            Self::PublicKey => "public key",
            Self::RelinKeys => "relinearization keys",
            Self::GaloisKeys => "galois keys",
            Self::Ciphertext => "ciphertext",
        };
        f.write_str(name)
    }
}

/// How the body is laid out
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum BodyEncoding {
    /// bincode, fixed-width integers
    #[default]
    Bincode = 0,
    /// Raw u32 LE residues, limb-major, one polynomial after another
    Compact = 1,
}

impl BodyEncoding {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Bincode),
            1 => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Parsed artifact header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactHeader {
    pub kind: ArtifactKind,
    pub encoding: BodyEncoding,
    pub fingerprint: Fingerprint,
    pub key_id: KeyId,
    pub body_len: u64,
    pub digest: BodyDigest,
}

impl ArtifactHeader {
    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_u16::<LittleEndian>(FORMAT_VERSION)?;
        writer.write_u8(self.kind as u8)?;
        writer.write_u8(self.encoding as u8)?;
        writer.write_all(&self.fingerprint)?;
        writer.write_all(self.key_id.as_bytes())?;
        writer.write_u64::<LittleEndian>(self.body_len)?;
        writer.write_all(&self.digest)?;
        Ok(())
    }

    /// Parse the header and return it with the body slice.
    ///
    /// The declared body length must match the remaining bytes exactly and
    /// the body must hash to the stored digest.
    pub fn parse(bytes: &[u8]) -> Result<(Self, &[u8])> {
        if bytes.len() < HEADER_LEN {
            return Err(de_err!(
                "artifact is {} bytes, shorter than the {HEADER_LEN}-byte header",
                bytes.len()
            ));
        }

        let mut cursor = Cursor::new(&bytes[..HEADER_LEN]);
        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(de_err!("bad magic {:02x?}", magic));
        }

        let version = cursor.read_u16::<LittleEndian>()?;
        if version != FORMAT_VERSION {
            return Err(de_err!("unsupported format version {version}"));
        }

        let raw_kind = cursor.read_u8()?;
        let kind = ArtifactKind::from_u8(raw_kind)
            .ok_or_else(|| de_err!("unknown artifact kind {raw_kind}"))?;
        let raw_encoding = cursor.read_u8()?;
        let encoding = BodyEncoding::from_u8(raw_encoding)
            .ok_or_else(|| de_err!("unknown body encoding {raw_encoding}"))?;

        let mut fingerprint = [0u8; 16];
        cursor.read_exact(&mut fingerprint)?;
        let mut key_id = [0u8; 16];
        cursor.read_exact(&mut key_id)?;
        let body_len = cursor.read_u64::<LittleEndian>()?;
        let mut digest = [0u8; 16];
        cursor.read_exact(&mut digest)?;

        let body = &bytes[HEADER_LEN..];
        if body.len() as u64 != body_len {
            return Err(de_err!(
                "header declares {body_len} body bytes, found {}",
                body.len()
            ));
        }
        if body_digest(body) != digest {
            return Err(de_err!("{kind} body does not match its digest"));
        }

        let header = Self {
            kind,
            encoding,
            fingerprint,
            key_id: KeyId(key_id),
            body_len,
            digest,
        };
        Ok((header, body))
    }
}

/// A type that can be sealed into an artifact
pub trait Artifact: Sized {
    const KIND: ArtifactKind;

    /// Encoding used by [`to_bytes`]
    const DEFAULT_ENCODING: BodyEncoding = BodyEncoding::Bincode;

    fn key_id(&self) -> KeyId;

    fn encode_body(&self, encoding: BodyEncoding) -> Result<Vec<u8>>;

    /// Decode and validate the body against `params`.
    fn decode_body(header: &ArtifactHeader, body: &[u8], params: &SchemeParameters) -> Result<Self>;
}

/// Serialize with the type's default body encoding
pub fn to_bytes<A: Artifact>(artifact: &A, params: &SchemeParameters) -> Result<Vec<u8>> {
    to_bytes_with(artifact, params, A::DEFAULT_ENCODING)
}

pub fn to_bytes_with<A: Artifact>(
    artifact: &A,
    params: &SchemeParameters,
    encoding: BodyEncoding,
) -> Result<Vec<u8>> {
    let body = artifact.encode_body(encoding)?;
    let header = ArtifactHeader {
        kind: A::KIND,
        encoding,
        fingerprint: params.fingerprint(),
        key_id: artifact.key_id(),
        body_len: body.len() as u64,
        digest: body_digest(&body),
    };

    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    header.write_to(&mut bytes)?;
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Parse an artifact of type `A` produced under `params`
pub fn from_bytes<A: Artifact>(bytes: &[u8], params: &SchemeParameters) -> Result<A> {
    let (header, body) = ArtifactHeader::parse(bytes)?;
    if header.kind != A::KIND {
        return Err(de_err!("expected {}, found {}", A::KIND, header.kind));
    }
    let expected = params.fingerprint();
    if header.fingerprint != expected {
        return Err(de_err!(
            "{} was produced under profile {}, expected {}",
            A::KIND,
            hex::encode(header.fingerprint),
            hex::encode(expected)
        ));
    }
    A::decode_body(&header, body, params)
}

fn bincode_options(limit: usize) -> impl Options {
    bincode::options()
        .with_fixint_encoding()
        .with_limit(limit as u64)
}

fn encode_bincode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::options().with_fixint_encoding().serialize(value)?)
}

/// Trailing bytes and oversized length prefixes are rejected
fn decode_bincode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(bincode_options(body.len()).deserialize(body)?)
}

fn unsupported(kind: ArtifactKind, encoding: BodyEncoding) -> Error {
    Error::InvalidInput(format!("{kind} does not support {encoding:?} bodies"))
}

fn check_poly(poly: &Poly, name: &str, params: &SchemeParameters) -> Result<()> {
    poly.check_shape(params.ring_degree, &params.moduli)
        .map_err(|e| de_err!("{name}: {e}"))
}

fn write_compact(polys: &[&Poly]) -> Result<Vec<u8>> {
    let len = polys.iter().map(|p| p.coeffs().len() * 4).sum();
    let mut bytes = Vec::with_capacity(len);
    for poly in polys {
        if poly.is_ntt() {
            return Err(Error::InvalidInput("cannot serialize an NTT-domain polynomial".into()));
        }
        for &c in poly.coeffs() {
            let c = u32::try_from(c)
                .map_err(|_| Error::InvalidInput(format!("residue {c} does not fit in 32 bits")))?;
            bytes.write_u32::<LittleEndian>(c)?;
        }
    }
    Ok(bytes)
}

fn read_compact(body: &[u8], count: usize, params: &SchemeParameters) -> Result<Vec<Poly>> {
    let n = params.ring_degree;
    let moduli = &params.moduli;
    let per_poly = n * moduli.len();
    if body.len() != count * per_poly * 4 {
        return Err(de_err!(
            "compact body is {} bytes, expected {}",
            body.len(),
            count * per_poly * 4
        ));
    }

    let mut cursor = Cursor::new(body);
    let mut polys = Vec::with_capacity(count);
    for p in 0..count {
        let mut coeffs = Vec::with_capacity(per_poly);
        for (l, &q) in moduli.iter().enumerate() {
            for i in 0..n {
                let c = cursor.read_u32::<LittleEndian>()? as u64;
                if c >= q {
                    return Err(de_err!(
                        "polynomial {p}: residue {c} at limb {l}, index {i} is not below {q}"
                    ));
                }
                coeffs.push(c);
            }
        }
        polys.push(Poly::from_coeffs_moduli(coeffs, moduli));
    }
    Ok(polys)
}

impl Artifact for SecretKey {
    const KIND: ArtifactKind = ArtifactKind::SecretKey;

    fn key_id(&self) -> KeyId {
        self.key_id
    }

    /// One signed byte per coefficient
    fn encode_body(&self, encoding: BodyEncoding) -> Result<Vec<u8>> {
        if encoding != BodyEncoding::Bincode {
            return Err(unsupported(Self::KIND, encoding));
        }
        let q = self.poly.moduli()[0];
        let ternary = self.poly.limb(0)
            .iter()
            .map(|&c| match ModQ::to_signed(c, q) {
                v @ -1..=1 => Ok(v as i8),
                v => Err(Error::InvalidInput(format!("secret coefficient {v} is not ternary"))),
            })
            .collect::<Result<Vec<i8>>>()?;
        encode_bincode(&ternary)
    }

    fn decode_body(header: &ArtifactHeader, body: &[u8], params: &SchemeParameters) -> Result<Self> {
        if header.encoding != BodyEncoding::Bincode {
            return Err(de_err!("{} must be bincode encoded", Self::KIND));
        }
        let ternary: Vec<i8> = decode_bincode(body)?;
        if ternary.len() != params.ring_degree {
            return Err(de_err!(
                "secret key has {} coefficients, expected {}",
                ternary.len(),
                params.ring_degree
            ));
        }
        if let Some(v) = ternary.iter().find(|v| !(-1..=1).contains(*v)) {
            return Err(de_err!("secret coefficient {v} is not ternary"));
        }

        let values: Vec<i64> = ternary.into_iter().map(i64::from).collect();
        Ok(Self {
            poly: Poly::from_signed(&values, params.ring_degree, &params.moduli),
            key_id: header.key_id,
        })
    }
}

impl Artifact for PublicKey {
    const KIND: ArtifactKind = ArtifactKind::PublicKey;

    fn key_id(&self) -> KeyId {
        self.key_id
    }

    fn encode_body(&self, encoding: BodyEncoding) -> Result<Vec<u8>> {
        match encoding {
            BodyEncoding::Bincode => encode_bincode(self),
            BodyEncoding::Compact => write_compact(&[&self.a, &self.b]),
        }
    }

    fn decode_body(header: &ArtifactHeader, body: &[u8], params: &SchemeParameters) -> Result<Self> {
        let mut pk: PublicKey = match header.encoding {
            BodyEncoding::Bincode => decode_bincode(body)?,
            BodyEncoding::Compact => {
                let mut polys = read_compact(body, 2, params)?.into_iter();
                match (polys.next(), polys.next()) {
                    (Some(a), Some(b)) => PublicKey { key_id: header.key_id, a, b },
                    _ => return Err(de_err!("public key body is incomplete")),
                }
            }
        };
        check_poly(&pk.a, "public key a", params)?;
        check_poly(&pk.b, "public key b", params)?;
        pk.key_id = header.key_id;
        Ok(pk)
    }
}

impl Artifact for Ciphertext {
    const KIND: ArtifactKind = ArtifactKind::Ciphertext;
    const DEFAULT_ENCODING: BodyEncoding = BodyEncoding::Compact;

    fn key_id(&self) -> KeyId {
        self.key_id
    }

    fn encode_body(&self, encoding: BodyEncoding) -> Result<Vec<u8>> {
        match encoding {
            BodyEncoding::Bincode => encode_bincode(self),
            BodyEncoding::Compact => write_compact(&[&self.a, &self.b]),
        }
    }

    fn decode_body(header: &ArtifactHeader, body: &[u8], params: &SchemeParameters) -> Result<Self> {
        let mut ct: Ciphertext = match header.encoding {
            BodyEncoding::Bincode => decode_bincode(body)?,
            BodyEncoding::Compact => {
                let mut polys = read_compact(body, 2, params)?.into_iter();
                match (polys.next(), polys.next()) {
                    (Some(a), Some(b)) => Ciphertext { key_id: header.key_id, a, b },
                    _ => return Err(de_err!("ciphertext body is incomplete")),
                }
            }
        };
        check_poly(&ct.a, "ciphertext a", params)?;
        check_poly(&ct.b, "ciphertext b", params)?;
        ct.key_id = header.key_id;
        Ok(ct)
    }
}

impl Artifact for RelinKeys {
    const KIND: ArtifactKind = ArtifactKind::RelinKeys;

    fn key_id(&self) -> KeyId {
        self.key_id
    }

    fn encode_body(&self, encoding: BodyEncoding) -> Result<Vec<u8>> {
        match encoding {
            BodyEncoding::Bincode => encode_bincode(self),
            BodyEncoding::Compact => Err(unsupported(Self::KIND, encoding)),
        }
    }

    fn decode_body(header: &ArtifactHeader, body: &[u8], params: &SchemeParameters) -> Result<Self> {
        if header.encoding != BodyEncoding::Bincode {
            return Err(de_err!("{} must be bincode encoded", Self::KIND));
        }
        let mut rk: RelinKeys = decode_bincode(body)?;
        rk.check_shape(params).map_err(|e| de_err!("relinearization keys: {e}"))?;
        rk.key_id = header.key_id;
        Ok(rk)
    }
}

impl Artifact for GaloisKeys {
    const KIND: ArtifactKind = ArtifactKind::GaloisKeys;

    fn key_id(&self) -> KeyId {
        self.key_id
    }

    fn encode_body(&self, encoding: BodyEncoding) -> Result<Vec<u8>> {
        match encoding {
            BodyEncoding::Bincode => encode_bincode(self),
            BodyEncoding::Compact => Err(unsupported(Self::KIND, encoding)),
        }
    }

    fn decode_body(header: &ArtifactHeader, body: &[u8], params: &SchemeParameters) -> Result<Self> {
        if header.encoding != BodyEncoding::Bincode {
            return Err(de_err!("{} must be bincode encoded", Self::KIND));
        }
        let mut gk: GaloisKeys = decode_bincode(body)?;
        gk.check_shape(params).map_err(|e| de_err!("galois keys: {e}"))?;
        gk.key_id = header.key_id;
        Ok(gk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bfv::{BatchEncoder, BfvContext, Encryptor};
    use crate::math::GaussianSampler;

    fn test_params() -> SchemeParameters {
        SchemeParameters {
            ring_degree: 256,
            moduli: vec![1073738753, 1073732609],
            plain_modulus: 1047041,
            sigma: 3.2,
            gadget_base: 1 << 20,
            gadget_len: 3,
            version: 1,
        }
    }

    struct Fixture {
        params: SchemeParameters,
        ctx: BfvContext,
        sk: SecretKey,
        pk: PublicKey,
        sampler: GaussianSampler,
    }

    fn fixture(seed: u64) -> Fixture {
        let params = test_params();
        let ctx = BfvContext::new(&params).unwrap();
        let mut sampler = GaussianSampler::with_seed(params.sigma, seed);
        let sk = SecretKey::generate(&ctx, KeyId::random(&mut sampler), &mut sampler);
        let pk = PublicKey::generate(&ctx, &sk, &mut sampler);
        Fixture { params, ctx, sk, pk, sampler }
    }

    /// Rewrite the stored digest after editing a body in place
    fn reseal(bytes: &mut [u8]) {
        let digest = body_digest(&bytes[HEADER_LEN..]);
        bytes[48..HEADER_LEN].copy_from_slice(&digest);
    }

    fn ciphertext(f: &mut Fixture) -> Ciphertext {
        let encoder = BatchEncoder::new(&f.params);
        let plain = encoder.encode(&[1, 0, 0, 1]).unwrap();
        Encryptor::new(&f.ctx, &f.pk).encrypt(&plain, &mut f.sampler)
    }

    #[test]
    fn test_header_layout() {
        let f = fixture(1);
        let bytes = to_bytes(&f.pk, &f.params).unwrap();

        assert_eq!(&bytes[..4], b"HESC");
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), FORMAT_VERSION);
        assert_eq!(bytes[6], ArtifactKind::PublicKey as u8);
        assert_eq!(bytes[7], BodyEncoding::Bincode as u8);
        assert_eq!(&bytes[8..24], &f.params.fingerprint());
        assert_eq!(&bytes[24..40], f.pk.key_id.as_bytes());
        assert_eq!(&bytes[48..64], &body_digest(&bytes[HEADER_LEN..]));

        let (header, body) = ArtifactHeader::parse(&bytes).unwrap();
        assert_eq!(header.body_len as usize, body.len());
        assert_eq!(body.len() + HEADER_LEN, bytes.len());
    }

    #[test]
    fn test_secret_key_is_one_byte_per_coefficient() {
        let f = fixture(2);
        let bytes = to_bytes(&f.sk, &f.params).unwrap();
        // bincode Vec<i8>: u64 length prefix then the bytes
        assert_eq!(bytes.len(), HEADER_LEN + 8 + 256);

        let loaded: SecretKey = from_bytes(&bytes, &f.params).unwrap();
        assert_eq!(loaded.poly, f.sk.poly);
        assert_eq!(loaded.key_id, f.sk.key_id);
    }

    #[test]
    fn test_compact_ciphertext_size_and_reload() {
        let mut f = fixture(3);
        let ct = ciphertext(&mut f);

        let bytes = to_bytes(&ct, &f.params).unwrap();
        assert_eq!(bytes[7], BodyEncoding::Compact as u8);
        assert_eq!(bytes.len(), HEADER_LEN + 2 * 2 * 256 * 4);

        let loaded: Ciphertext = from_bytes(&bytes, &f.params).unwrap();
        assert_eq!(loaded, ct);

        let bincode_bytes = to_bytes_with(&ct, &f.params, BodyEncoding::Bincode).unwrap();
        let loaded: Ciphertext = from_bytes(&bincode_bytes, &f.params).unwrap();
        assert_eq!(loaded, ct);
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let f = fixture(4);
        let bytes = to_bytes(&f.pk, &f.params).unwrap();
        let result: Result<SecretKey> = from_bytes(&bytes, &f.params);
        assert!(matches!(result, Err(Error::Deserialization(_))));
    }

    #[test]
    fn test_other_profile_is_rejected() {
        let f = fixture(5);
        let bytes = to_bytes(&f.sk, &f.params).unwrap();

        let mut other = test_params();
        other.plain_modulus = 786433;
        let result: Result<SecretKey> = from_bytes(&bytes, &other);
        match result {
            Err(Error::Deserialization(msg)) => assert!(msg.contains("profile")),
            other => panic!("expected profile mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_and_extended_bytes_are_rejected() {
        let mut f = fixture(6);
        let ct = ciphertext(&mut f);
        let bytes = to_bytes(&ct, &f.params).unwrap();

        for len in [0, 3, HEADER_LEN - 1, HEADER_LEN, bytes.len() - 1] {
            let result: Result<Ciphertext> = from_bytes(&bytes[..len], &f.params);
            assert!(matches!(result, Err(Error::Deserialization(_))), "len {len}");
        }

        let mut extended = bytes.clone();
        extended.push(0);
        let result: Result<Ciphertext> = from_bytes(&extended, &f.params);
        assert!(matches!(result, Err(Error::Deserialization(_))));
    }

    #[test]
    fn test_out_of_range_residue_is_rejected() {
        let mut f = fixture(7);
        let ct = ciphertext(&mut f);
        let mut bytes = to_bytes(&ct, &f.params).unwrap();

        bytes[HEADER_LEN..HEADER_LEN + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        reseal(&mut bytes);
        let result: Result<Ciphertext> = from_bytes(&bytes, &f.params);
        match result {
            Err(Error::Deserialization(msg)) => assert!(msg.contains("residue")),
            other => panic!("expected residue range error, got {other:?}"),
        }
    }

    #[test]
    fn test_flipped_body_bit_is_rejected() {
        let mut f = fixture(10);
        let ct = ciphertext(&mut f);
        let bytes = to_bytes(&ct, &f.params).unwrap();

        // Low bit of a residue: the value stays in range, only the digest notices
        for offset in [1, 4 * 256 + 2, bytes.len() - HEADER_LEN - 4] {
            let mut tampered = bytes.clone();
            tampered[HEADER_LEN + offset] ^= 0x01;
            match from_bytes::<Ciphertext>(&tampered, &f.params) {
                Err(Error::Deserialization(msg)) => assert!(msg.contains("digest"), "{msg}"),
                other => panic!("offset {offset}: expected digest mismatch, got {other:?}"),
            }
        }

        let mut tampered_digest = bytes;
        tampered_digest[50] ^= 0x80;
        assert!(ArtifactHeader::parse(&tampered_digest).is_err());
    }

    #[test]
    fn test_bad_magic_and_version() {
        let f = fixture(8);
        let bytes = to_bytes(&f.pk, &f.params).unwrap();

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(ArtifactHeader::parse(&bad_magic).is_err());

        let mut bad_version = bytes.clone();
        bad_version[4] = 9;
        assert!(ArtifactHeader::parse(&bad_version).is_err());

        let mut bad_kind = bytes;
        bad_kind[6] = 42;
        assert!(ArtifactHeader::parse(&bad_kind).is_err());
    }

    #[test]
    fn test_key_switching_artifacts_reload() {
        let mut f = fixture(9);
        let rk = RelinKeys::generate(&f.ctx, &f.sk, &mut f.sampler);
        let gk = GaloisKeys::generate(&f.ctx, &f.sk, &mut f.sampler);

        let rk_loaded: RelinKeys = from_bytes(&to_bytes(&rk, &f.params).unwrap(), &f.params).unwrap();
        assert_eq!(rk_loaded, rk);

        let gk_loaded: GaloisKeys = from_bytes(&to_bytes(&gk, &f.params).unwrap(), &f.params).unwrap();
        assert_eq!(gk_loaded, gk);

        assert!(to_bytes_with(&rk, &f.params, BodyEncoding::Compact).is_err());
    }
}
