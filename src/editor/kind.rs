//! Editor kinds and their static resource bindings.

use std::fmt;
use std::str::FromStr;

/// Fixed binding of an editor kind to a backend collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Path segment of the collection, e.g. `plugin`
    pub segment: &'static str,
    /// Tab title while creating a new record
    pub create_title: &'static str,
    /// Tab title prefix once an existing record is loaded
    pub edit_title: &'static str,
    /// Whether the backend exposes `start` / `stop` on `{segment}/{id}`
    pub controllable: bool,
}

/// Every kind of hosted editor the workspace can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EditorKind {
    Channel,
    Plugin,
    ProjectAdapter,
    Tunnel,
    Link,
    Device,
    Model,
}

impl EditorKind {
    /// All kinds, in display order
    pub fn all() -> &'static [EditorKind] {
        &[
            EditorKind::Channel,
            EditorKind::Plugin,
            EditorKind::ProjectAdapter,
            EditorKind::Tunnel,
            EditorKind::Link,
            EditorKind::Device,
            EditorKind::Model,
        ]
    }

    pub fn descriptor(self) -> ResourceDescriptor {
        match self {
            EditorKind::Channel => ResourceDescriptor {
                segment: "channel",
                create_title: "Create Channel",
                edit_title: "Edit Channel",
                controllable: true,
            },
            EditorKind::Plugin => ResourceDescriptor {
                segment: "plugin",
                create_title: "Create Plugin",
                edit_title: "Edit Plugin",
                controllable: false,
            },
            EditorKind::ProjectAdapter => ResourceDescriptor {
                segment: "project-adapter",
                create_title: "Create Protocol Adapter",
                edit_title: "Edit Protocol Adapter",
                controllable: false,
            },
            EditorKind::Tunnel => ResourceDescriptor {
                segment: "tunnel",
                create_title: "Create Tunnel",
                edit_title: "Edit Tunnel",
                controllable: false,
            },
            EditorKind::Link => ResourceDescriptor {
                segment: "link",
                create_title: "Create Link",
                edit_title: "Edit Link",
                controllable: false,
            },
            EditorKind::Device => ResourceDescriptor {
                segment: "device",
                create_title: "Create Device",
                edit_title: "Edit Device",
                controllable: false,
            },
            EditorKind::Model => ResourceDescriptor {
                segment: "model",
                create_title: "Create Model",
                edit_title: "Edit Model",
                controllable: false,
            },
        }
    }

    /// Backend path segment
    pub fn segment(self) -> &'static str {
        self.descriptor().segment
    }
}

impl fmt::Display for EditorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for EditorKind {
    type Err = String;

    /// Parse a path segment (`project-adapter`) or its underscore form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        EditorKind::all()
            .iter()
            .copied()
            .find(|kind| kind.segment() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = EditorKind::all().iter().map(|k| k.segment()).collect();
                format!("unknown editor kind '{}' (known: {})", s, known.join(", "))
            })
    }
}
