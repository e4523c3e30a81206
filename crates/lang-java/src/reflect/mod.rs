use luasense_plugin::{BoxError, ClassMembers, ClassReflector, ReflectedArchive};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

mod converter;
mod members;

pub use converter::JavaTypeConverter;
pub use members::reflect_class;

const CLASS_SUFFIX: &str = ".class";

/// Reads JAR and ZIP archives of class files.
pub struct JavaArchiveReflector;

impl ClassReflector for JavaArchiveReflector {
    fn name(&self) -> &str {
        "java-archive"
    }

    fn can_reflect(&self, archive: &Path) -> bool {
        let ext = archive
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        ext == "jar" || ext == "zip"
    }

    fn open(&self, archive: &Path) -> Result<Box<dyn ReflectedArchive>, BoxError> {
        Ok(Box::new(JarArchive::open(archive)?))
    }
}

/// An opened archive with its class entries listed up front.
pub struct JarArchive {
    path: PathBuf,
    archive: ZipArchive<File>,
    // binary class name → entry path
    entries: BTreeMap<String, String>,
}

impl JarArchive {
    pub fn open(path: &Path) -> Result<Self, BoxError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;

        let mut entries = BTreeMap::new();
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            let name = entry.name();
            let Some(stem) = name.strip_suffix(CLASS_SUFFIX) else {
                continue;
            };
            if stem.starts_with("META-INF/") || stem.contains('-') {
                continue;
            }
            entries.insert(stem.replace('/', "."), name.to_string());
        }

        tracing::debug!("{}: {} class entries", path.display(), entries.len());
        Ok(Self {
            path: path.to_path_buf(),
            archive,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_class(&mut self, class: &str) -> Result<Vec<u8>, BoxError> {
        let entry_name = self
            .entries
            .get(class)
            .ok_or_else(|| format!("Class {class} not found in {}", self.path.display()))?;
        let mut entry = self.archive.by_name(entry_name)?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl ReflectedArchive for JarArchive {
    fn class_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn reflect(&mut self, class: &str) -> Result<ClassMembers, BoxError> {
        let bytes = self.read_class(class)?;
        reflect_class(class, bytes)
    }

    /// Entries are read one after another (the archive is not shareable),
    /// then parsed in parallel.
    fn reflect_batch(&mut self, classes: &[String]) -> Vec<(String, Result<ClassMembers, BoxError>)> {
        let loaded: Vec<(String, Result<Vec<u8>, BoxError>)> = classes
            .iter()
            .map(|class| (class.clone(), self.read_class(class)))
            .collect();

        loaded
            .into_par_iter()
            .map(|(class, bytes)| {
                let result = bytes.and_then(|bytes| reflect_class(&class, bytes));
                (class, result)
            })
            .collect()
    }

    fn inner_classes(&mut self, class: &str) -> Result<Vec<String>, BoxError> {
        let marker = format!("{class}$");
        Ok(self
            .entries
            .range(marker.clone()..)
            .map(|(name, _)| name)
            .take_while(|name| name.starts_with(&marker))
            .filter(|name| {
                let inner = &name[marker.len()..];
                !inner.is_empty()
                    && !inner.contains('$')
                    && !inner.starts_with(|c: char| c.is_ascii_digit())
            })
            .cloned()
            .collect())
    }
}
