use std::{fs, io, path::Path};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program, loaded starting at the program counter start
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data
    pub fn new(name: &str, data: &[u8]) -> Self {
        Rom {
            name: name.to_string(),
            data: data.into(),
        }
    }

    /// Will read a raw rom image from the given file, the name is the file stem.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::debug!("read rom '{}' with {} bytes", name, data.len());
        Ok(Rom {
            name,
            data: data.into_boxed_slice(),
        })
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}
