//! External tensor data resolution.
//!
//! Large tensors may store their payload in side files next to the model,
//! addressed by a location string plus optional byte offset and length in the
//! tensor's external-data metadata.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::onnx::TensorProto;

/// Read a tensor's externally-stored payload.
///
/// Relative locations resolve against the directory containing the model
/// file. A positive offset seeks before reading; a positive length reads
/// exactly that many bytes, otherwise the remainder of the file is returned.
pub fn load_external_data(t: &TensorProto, model_path: Option<&Path>) -> Result<Vec<u8>> {
    let mut location: Option<&str> = None;
    let mut offset: u64 = 0;
    let mut length: u64 = 0;

    for entry in &t.external_data {
        match entry.key.as_str() {
            "location" => location = Some(entry.value.as_str()),
            "offset" if !entry.value.is_empty() => {
                offset = entry
                    .value
                    .parse()
                    .map_err(|_| ConvertError::InvalidExternalField {
                        key: "offset",
                        value: entry.value.clone(),
                    })?;
            }
            "length" if !entry.value.is_empty() => {
                length = entry
                    .value
                    .parse()
                    .map_err(|_| ConvertError::InvalidExternalField {
                        key: "length",
                        value: entry.value.clone(),
                    })?;
            }
            _ => {}
        }
    }

    let location = match location {
        Some(l) if !l.is_empty() => l,
        _ => return Err(ConvertError::MissingExternalLocation),
    };

    let path = resolve_location(location, model_path);
    tracing::debug!(
        "loading external data for '{}' from {} (offset {}, length {})",
        t.name,
        path.display(),
        offset,
        length
    );

    let mut file = File::open(&path).map_err(|e| ConvertError::ExternalOpen {
        path: path.clone(),
        source: e,
    })?;

    let read_err = |e| ConvertError::ExternalRead {
        path: path.clone(),
        source: e,
    };

    if offset > 0 {
        file.seek(SeekFrom::Start(offset)).map_err(read_err)?;
    }

    if length > 0 {
        let mut data = vec![0u8; length as usize];
        file.read_exact(&mut data).map_err(read_err)?;
        Ok(data)
    } else {
        let size = file.metadata().map_err(read_err)?.len();
        if offset > 0 && offset >= size {
            return Err(ConvertError::ExternalOffset { offset, size });
        }
        let mut data = Vec::new();
        file.read_to_end(&mut data).map_err(read_err)?;
        Ok(data)
    }
}

fn resolve_location(location: &str, model_path: Option<&Path>) -> PathBuf {
    let loc = Path::new(location);
    if loc.is_absolute() {
        return loc.to_path_buf();
    }
    let dir = model_path
        .and_then(Path::parent)
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    dir.join(loc)
}
