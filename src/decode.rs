//! Shape recording decoder
//!
//! Recordings are protobuf `ShapesIteration` messages wrapped in a zstd
//! stream, one file per benchmark run:
//!
//! ```text
//! shapes.binpb.zst
//! └─ zstd frame
//!    └─ ShapesIteration { epochs: [ShapesEpoch { shapes: [Shape] }] }
//! ```
//!
//! Every error carries the path of the file being decoded so a failing
//! benchmark can be identified from the batch summary alone.

use crate::shape::{Epoch, ShapeKind, ShapeRecord, ShapesCorpus};
use prost::Message;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// zstd level used by [`write_corpus`] (0 selects the library default)
const ZSTD_LEVEL: i32 = 0;

/// Protobuf messages of the shape recording schema
pub mod wire {
    /// One observed object
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Shape {
        #[prost(enumeration = "Kind", tag = "1")]
        pub kind: i32,
        #[prost(uint64, tag = "2")]
        pub object: u64,
        #[prost(int64, repeated, tag = "3")]
        pub offsets: Vec<i64>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Kind {
        ValArray = 0,
        ObjArray = 1,
        Scalar = 2,
    }

    /// Shapes of one collection pass
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ShapesEpoch {
        #[prost(message, repeated, tag = "1")]
        pub shapes: Vec<Shape>,
    }

    /// Shapes of every collection pass in one benchmark run
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ShapesIteration {
        #[prost(message, repeated, tag = "1")]
        pub epochs: Vec<ShapesEpoch>,
    }
}

/// Errors that can occur while decoding a single recording
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decompress {path}: {source}")]
    Decompress {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed shape recording {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: prost::DecodeError,
    },

    #[error("unknown shape kind {kind} in {path} (epoch {epoch}, shape {index})")]
    UnknownKind {
        path: PathBuf,
        kind: i32,
        epoch: usize,
        index: usize,
    },

    #[error("timed out decoding {path} after {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("worker decoding {path} exited without a result")]
    WorkerPanicked { path: PathBuf },
}

impl DecodeError {
    /// File the error refers to
    pub fn path(&self) -> &Path {
        match self {
            DecodeError::Io { path, .. }
            | DecodeError::Decompress { path, .. }
            | DecodeError::Malformed { path, .. }
            | DecodeError::UnknownKind { path, .. }
            | DecodeError::Timeout { path, .. }
            | DecodeError::WorkerPanicked { path } => path,
        }
    }
}

/// Decode an already-decompressed recording
///
/// `source` only labels errors; nothing is read from it.
pub fn decode_corpus(bytes: &[u8], source: &Path) -> Result<ShapesCorpus, DecodeError> {
    let iteration =
        wire::ShapesIteration::decode(bytes).map_err(|e| DecodeError::Malformed {
            path: source.to_path_buf(),
            source: e,
        })?;

    let mut epochs = Vec::with_capacity(iteration.epochs.len());
    for (epoch_idx, epoch) in iteration.epochs.into_iter().enumerate() {
        let mut shapes = Vec::with_capacity(epoch.shapes.len());
        for (index, shape) in epoch.shapes.into_iter().enumerate() {
            let kind = match wire::Kind::try_from(shape.kind) {
                Ok(wire::Kind::ValArray) => ShapeKind::ValueArray,
                Ok(wire::Kind::ObjArray) => ShapeKind::ObjectArray,
                Ok(wire::Kind::Scalar) => ShapeKind::Generic,
                Err(_) => {
                    return Err(DecodeError::UnknownKind {
                        path: source.to_path_buf(),
                        kind: shape.kind,
                        epoch: epoch_idx,
                        index,
                    })
                }
            };
            shapes.push(ShapeRecord {
                kind,
                address: shape.object,
                offsets: shape.offsets,
            });
        }
        epochs.push(Epoch::new(shapes));
    }

    Ok(ShapesCorpus::new(epochs))
}

/// Inflate a zstd stream into memory
pub fn decompress<R: Read>(reader: R, source: &Path) -> Result<Vec<u8>, DecodeError> {
    let to_err = |e: io::Error| DecodeError::Decompress {
        path: source.to_path_buf(),
        source: e,
    };
    let mut decoder = zstd::stream::read::Decoder::new(reader).map_err(to_err)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf).map_err(to_err)?;
    Ok(buf)
}

/// Read, decompress and decode one recording file
pub fn read_corpus(path: &Path) -> Result<ShapesCorpus, DecodeError> {
    let file = File::open(path).map_err(|e| DecodeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let bytes = decompress(file, path)?;
    tracing::trace!(path = %path.display(), bytes = bytes.len(), "decompressed recording");
    decode_corpus(&bytes, path)
}

/// Serialize a corpus into the (uncompressed) protobuf payload
pub fn encode_corpus(corpus: &ShapesCorpus) -> Vec<u8> {
    let iteration = wire::ShapesIteration {
        epochs: corpus
            .epochs
            .iter()
            .map(|epoch| wire::ShapesEpoch {
                shapes: epoch
                    .shapes
                    .iter()
                    .map(|shape| wire::Shape {
                        kind: match shape.kind {
                            ShapeKind::ValueArray => wire::Kind::ValArray,
                            ShapeKind::ObjectArray => wire::Kind::ObjArray,
                            ShapeKind::Generic => wire::Kind::Scalar,
                        } as i32,
                        object: shape.address,
                        offsets: shape.offsets.clone(),
                    })
                    .collect(),
            })
            .collect(),
    };
    iteration.encode_to_vec()
}

/// Write a corpus as a zstd-compressed recording
pub fn write_corpus(path: &Path, corpus: &ShapesCorpus) -> io::Result<()> {
    let file = File::create(path)?;
    let mut encoder = zstd::stream::write::Encoder::new(file, ZSTD_LEVEL)?;
    encoder.write_all(&encode_corpus(corpus))?;
    encoder.finish()?.sync_all()
}
