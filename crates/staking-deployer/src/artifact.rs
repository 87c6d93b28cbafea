//! Lookup of compiled contract artifacts by contract name.
//!
//! Both the Hardhat (`artifacts/contracts/<File>.sol/<Name>.json`) and the
//! Foundry (`out/<File>.sol/<Name>.json`) layouts are supported.

use {
    crate::parameters::{CONSTRUCTOR_TYPES, DeploymentParameters},
    alloy::{
        json_abi::JsonAbi,
        primitives::{Bytes, hex},
    },
    serde::Deserialize,
    std::path::{Path, PathBuf},
    tokio::fs,
};

/// Compiled contract ready to be deployed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub abi: JsonAbi,
    /// Creation code without constructor arguments.
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
struct RawArtifact {
    abi: JsonAbi,
    bytecode: RawBytecode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hardhat(String),
    Foundry { object: String },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no artifact for contract {name:?} found in {dir:?}")]
    NotFound { name: String, dir: PathBuf },
    #[error("contract name {name:?} is ambiguous, found artifacts {paths:?}")]
    Ambiguous { name: String, paths: Vec<PathBuf> },
    #[error("I/O error while reading {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed artifact {path:?}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("bytecode of contract {name:?} is not valid hex, is it linked?")]
    Bytecode {
        name: String,
        #[source]
        source: hex::FromHexError,
    },
    #[error("contract {0:?} has no creation code, is it abstract?")]
    Abstract(String),
    #[error("constructor of contract {name:?} takes ({actual}) but ({expected}) is passed")]
    ConstructorMismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

impl Artifact {
    /// Parses a compiler artifact and checks that its constructor accepts the
    /// staking deployment parameters.
    pub fn from_json(name: &str, json: &str, path: &Path) -> Result<Self, Error> {
        let raw: RawArtifact = serde_json::from_str(json).map_err(|source| Error::Malformed {
            path: path.to_owned(),
            source,
        })?;
        let code = match raw.bytecode {
            RawBytecode::Hardhat(code) => code,
            RawBytecode::Foundry { object } => object,
        };
        let bytecode = hex::decode(code.trim()).map_err(|source| Error::Bytecode {
            name: name.to_owned(),
            source,
        })?;
        if bytecode.is_empty() {
            return Err(Error::Abstract(name.to_owned()));
        }

        let artifact = Self {
            name: name.to_owned(),
            abi: raw.abi,
            bytecode: bytecode.into(),
        };
        artifact.check_constructor()?;
        Ok(artifact)
    }

    fn check_constructor(&self) -> Result<(), Error> {
        let actual = self
            .abi
            .constructor()
            .map(|constructor| {
                constructor
                    .inputs
                    .iter()
                    .map(|param| param.ty.as_str())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        if actual != CONSTRUCTOR_TYPES {
            return Err(Error::ConstructorMismatch {
                name: self.name.clone(),
                expected: CONSTRUCTOR_TYPES.join(","),
                actual: actual.join(","),
            });
        }
        Ok(())
    }

    /// Creation code followed by the ABI encoded constructor arguments.
    pub fn creation_code(&self, parameters: &DeploymentParameters) -> Bytes {
        let mut code = self.bytecode.to_vec();
        code.extend(parameters.abi_encode());
        code.into()
    }
}

/// Provides deployable artifacts by contract name.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContractFactory: Send + Sync {
    async fn contract(&self, name: &str) -> Result<Artifact, Error>;
}

/// Artifacts directory written by the contract compiler.
pub struct ArtifactDir {
    root: PathBuf,
}

impl ArtifactDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Finds every `<name>.json` that sits in a `*.sol` directory below the
    /// root. `build-info` directories only hold compiler input and are skipped.
    async fn find(&self, name: &str) -> Result<Vec<PathBuf>, Error> {
        let file_name = format!("{name}.json");
        let io_error = |path: &Path| {
            let path = path.to_owned();
            move |source| Error::Io { path, source }
        };

        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await.map_err(io_error(&dir))?;
            while let Some(entry) = entries.next_entry().await.map_err(io_error(&dir))? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(io_error(&path))?;
                if file_type.is_dir() {
                    if entry.file_name() != "build-info" {
                        pending.push(path);
                    }
                    continue;
                }
                let in_source_dir = dir.extension().is_some_and(|ext| ext == "sol");
                if in_source_dir && entry.file_name().to_str() == Some(file_name.as_str()) {
                    found.push(path);
                }
            }
        }
        found.sort();
        Ok(found)
    }
}

#[async_trait::async_trait]
impl ContractFactory for ArtifactDir {
    async fn contract(&self, name: &str) -> Result<Artifact, Error> {
        let mut paths = self.find(name).await?;
        let path = match paths.len() {
            0 => {
                return Err(Error::NotFound {
                    name: name.to_owned(),
                    dir: self.root.clone(),
                });
            }
            1 => paths.remove(0),
            _ => {
                return Err(Error::Ambiguous {
                    name: name.to_owned(),
                    paths,
                });
            }
        };
        tracing::debug!(?path, "loading contract artifact");
        let json = fs::read_to_string(&path).await.map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        Artifact::from_json(name, &json, &path)
    }
}
