// Helpers compartidos por los tests de integración de forge-adapters.
#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use forge_adapters::steps::{CompileRequest, Compiler};
use forge_core::CoreError;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Escribe un zip; `None` declara un directorio.
pub fn write_zip(path: &Path, entries: &[(&str, Option<&[u8]>)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        match bytes {
            Some(bytes) => {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(bytes).unwrap();
            }
            None => zip.add_directory(*name, SimpleFileOptions::default()).unwrap(),
        }
    }
    zip.finish().unwrap();
}

/// Entradas de un zip en orden almacenado, con su contenido.
pub fn read_zip(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len()).map(|i| {
                          let mut entry = archive.by_index(i).unwrap();
                          let mut bytes = Vec::new();
                          entry.read_to_end(&mut bytes).unwrap();
                          (entry.name().to_string(), bytes)
                      })
                      .collect()
}

pub fn entry_names(path: &Path) -> Vec<String> {
    read_zip(path).into_iter().map(|(name, _)| name).collect()
}

/// Compilador falso: por cada `X.java` (fuentes y sourcepath) escribe
/// `X.class` y `X$Inner.class`.
#[derive(Debug, Default)]
pub struct FakeCompiler {
    pub runs: Arc<AtomicUsize>,
}

impl FakeCompiler {
    fn emit(root: &Path, classes: &Path) -> Result<(), CoreError> {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| CoreError::Internal(e.to_string()))?;
            let Ok(relative) = entry.path().strip_prefix(root) else { continue };
            let Some(stem) = relative.to_str().and_then(|s| s.strip_suffix(".java")) else { continue };
            let class = classes.join(format!("{stem}.class"));
            fs::create_dir_all(class.parent().unwrap()).map_err(|e| CoreError::io(&class, e))?;
            fs::write(&class, b"class").map_err(|e| CoreError::io(&class, e))?;
            fs::write(classes.join(format!("{stem}$Inner.class")), b"inner").map_err(|e| CoreError::io(&class, e))?;
        }
        Ok(())
    }
}

impl Compiler for FakeCompiler {
    fn id(&self) -> &str {
        "fake"
    }

    fn compile(&self, request: &CompileRequest) -> Result<(), CoreError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Self::emit(&request.source_root, &request.classes_dir)?;
        if let Some(sourcepath) = &request.sourcepath {
            Self::emit(sourcepath, &request.classes_dir)?;
        }
        Ok(())
    }
}

/// Entrada de un zip escrito byte a byte (sin compresión).
pub struct RawEntry<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
    /// Tamaño descomprimido declarado en un extra field zip64.
    pub zip64_size: Option<u64>,
}

impl<'a> RawEntry<'a> {
    pub fn new(name: &'a str, data: &'a [u8]) -> Self {
        Self { name,
               data,
               zip64_size: None }
    }
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = !0u32;
    for byte in bytes {
        crc ^= u32::from(*byte);
        for _ in 0..8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
        }
    }
    !crc
}

/// Escribe un zip a mano, para casos que `ZipWriter` rechaza (nombres
/// repetidos, cabeceras con tamaños falsos).
pub fn write_raw_zip(path: &Path, entries: &[RawEntry<'_>]) {
    let mut out: Vec<u8> = Vec::new();
    let mut central: Vec<u8> = Vec::new();
    for entry in entries {
        let offset = out.len() as u32;
        let crc = crc32(entry.data);
        let size = entry.data.len() as u32;
        let mut extra = Vec::new();
        let declared = match entry.zip64_size {
            Some(declared) => {
                extra.extend_from_slice(&1u16.to_le_bytes());
                extra.extend_from_slice(&8u16.to_le_bytes());
                extra.extend_from_slice(&declared.to_le_bytes());
                u32::MAX
            }
            None => size,
        };

        // Cabecera local: versión, flags, método stored, hora, fecha 1980-01-01.
        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        for field in [20u16, 0, 0, 0, 0x21] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        for field in [crc, size, declared] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        out.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
        out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        out.extend_from_slice(entry.name.as_bytes());
        out.extend_from_slice(&extra);
        out.extend_from_slice(entry.data);

        central.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        for field in [20u16, 20, 0, 0, 0, 0x21] {
            central.extend_from_slice(&field.to_le_bytes());
        }
        for field in [crc, size, declared] {
            central.extend_from_slice(&field.to_le_bytes());
        }
        for field in [entry.name.len() as u16, extra.len() as u16, 0, 0, 0] {
            central.extend_from_slice(&field.to_le_bytes());
        }
        central.extend_from_slice(&0u32.to_le_bytes());
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(entry.name.as_bytes());
        central.extend_from_slice(&extra);
    }

    let central_start = out.len() as u32;
    let central_len = central.len() as u32;
    out.extend_from_slice(&central);
    out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    for field in [0u16, 0, entries.len() as u16, entries.len() as u16] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    out.extend_from_slice(&central_len.to_le_bytes());
    out.extend_from_slice(&central_start.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    fs::write(path, out).unwrap();
}
