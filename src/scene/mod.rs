//! Scene-graph grens en een eenvoudige retained implementatie.
//!
//! De assembler hangt primitieven aan en haalt ze weer los via [`SceneGraph`];
//! de host-renderer leest per frame wat er op dat moment aan hangt.

use std::collections::BTreeMap;

pub mod assembler;
pub mod primitive;

pub use assembler::{AssemblerState, CurveRecord, RebuildReport, SceneAssembler, SceneError};
pub use primitive::{LineMaterial, LinePrimitive, MeshPrimitive, Primitive, SurfaceMaterial};

/// Identifier voor een primitief binnen de scene. Ids worden nooit hergebruikt.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd, serde::Serialize)]
pub struct PrimitiveId(pub usize);

impl PrimitiveId {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }
}

impl From<usize> for PrimitiveId {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

/// Container waar de assembler zijn primitieven aan hangt.
pub trait SceneGraph {
    /// Hang een primitief aan de scene en geef het nieuwe id terug.
    fn attach(&mut self, primitive: Primitive) -> PrimitiveId;

    /// Haal een primitief los; `None` als het id niet (meer) bestaat.
    fn detach(&mut self, id: PrimitiveId) -> Option<Primitive>;

    fn primitive(&self, id: PrimitiveId) -> Option<&Primitive>;

    fn primitive_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive>;

    /// Ids van alle aangehangen primitieven, oplopend.
    fn ids(&self) -> Vec<PrimitiveId>;

    fn len(&self) -> usize;

    fn contains(&self, id: PrimitiveId) -> bool {
        self.primitive(id).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory scene met oplopende ids.
#[derive(Debug, Clone, Default)]
pub struct RetainedScene {
    primitives: BTreeMap<PrimitiveId, Primitive>,
    next_id: usize,
}

impl RetainedScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.primitives.iter().map(|(id, primitive)| (*id, primitive))
    }
}

impl SceneGraph for RetainedScene {
    fn attach(&mut self, primitive: Primitive) -> PrimitiveId {
        let id = PrimitiveId::new(self.next_id);
        self.next_id += 1;
        self.primitives.insert(id, primitive);
        id
    }

    fn detach(&mut self, id: PrimitiveId) -> Option<Primitive> {
        self.primitives.remove(&id)
    }

    fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(&id)
    }

    fn primitive_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.primitives.get_mut(&id)
    }

    fn ids(&self) -> Vec<PrimitiveId> {
        self.primitives.keys().copied().collect()
    }

    fn len(&self) -> usize {
        self.primitives.len()
    }
}
