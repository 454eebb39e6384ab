//! Drawable objects and the release walk over their GPU resources
//!
//! A [`DrawableObject`] owns one geometry resource and one or more material
//! resources. Both slots are optional so that a released (or never uploaded)
//! object can be walked again without faulting.

use std::ops::AddAssign;

/// A GPU allocation that must be freed explicitly.
pub trait GpuResource {
    /// Frees the underlying GPU memory.
    fn release(self);
}

/// Material slot of a drawable: either one material for the whole geometry
/// or one material per index group.
#[derive(Debug)]
pub enum Materials<M> {
    Single(M),
    Multi(Vec<M>),
}

impl<M> Materials<M> {
    /// Material used for the given index group.
    ///
    /// A single material covers every group. Multi-material objects fall back
    /// to their last material when there are more groups than materials.
    pub fn get(&self, group: usize) -> Option<&M> {
        match self {
            Materials::Single(material) => Some(material),
            Materials::Multi(materials) => materials.get(group).or_else(|| materials.last()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Materials::Single(_) => 1,
            Materials::Multi(materials) => materials.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        match self {
            Materials::Single(material) => std::slice::from_ref(material).iter(),
            Materials::Multi(materials) => materials.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, M> {
        match self {
            Materials::Single(material) => std::slice::from_mut(material).iter_mut(),
            Materials::Multi(materials) => materials.iter_mut(),
        }
    }
}

impl<M> IntoIterator for Materials<M> {
    type Item = M;
    type IntoIter = std::vec::IntoIter<M>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Materials::Single(material) => vec![material].into_iter(),
            Materials::Multi(materials) => materials.into_iter(),
        }
    }
}

/// Counts produced by a release walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseStats {
    pub geometries: usize,
    pub materials: usize,
    /// Slots found empty during the walk. Never an error.
    pub already_released: usize,
}

impl ReleaseStats {
    /// Number of resources actually freed.
    pub fn released(&self) -> usize {
        self.geometries + self.materials
    }
}

impl AddAssign for ReleaseStats {
    fn add_assign(&mut self, rhs: Self) {
        self.geometries += rhs.geometries;
        self.materials += rhs.materials;
        self.already_released += rhs.already_released;
    }
}

/// A renderable unit: one geometry resource plus its material resources.
#[derive(Debug)]
pub struct DrawableObject<G, M> {
    pub name: String,
    geometry: Option<G>,
    materials: Option<Materials<M>>,
}

impl<G: GpuResource, M: GpuResource> DrawableObject<G, M> {
    pub fn new(name: impl Into<String>, geometry: G, materials: Materials<M>) -> Self {
        Self {
            name: name.into(),
            geometry: Some(geometry),
            materials: Some(materials),
        }
    }

    /// Builds a drawable from possibly-missing parts.
    pub fn from_parts(
        name: impl Into<String>,
        geometry: Option<G>,
        materials: Option<Materials<M>>,
    ) -> Self {
        Self {
            name: name.into(),
            geometry,
            materials,
        }
    }

    pub fn geometry(&self) -> Option<&G> {
        self.geometry.as_ref()
    }

    pub fn materials(&self) -> Option<&Materials<M>> {
        self.materials.as_ref()
    }

    pub fn materials_mut(&mut self) -> Option<&mut Materials<M>> {
        self.materials.as_mut()
    }

    /// Whether any resource of this object is still live.
    pub fn is_live(&self) -> bool {
        self.live_resources() > 0
    }

    /// Live geometry plus material resources.
    pub fn live_resources(&self) -> usize {
        usize::from(self.geometry.is_some()) + self.materials.as_ref().map_or(0, Materials::len)
    }

    /// Releases the geometry and every material exactly once.
    ///
    /// Empty slots are skipped and counted as already released.
    pub fn release(&mut self) -> ReleaseStats {
        let mut stats = ReleaseStats::default();

        match self.geometry.take() {
            Some(geometry) => {
                geometry.release();
                stats.geometries += 1;
            }
            None => stats.already_released += 1,
        }

        match self.materials.take() {
            Some(materials) => {
                for material in materials {
                    material.release();
                    stats.materials += 1;
                }
            }
            None => stats.already_released += 1,
        }

        stats
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    /// Resource that tracks how many of its siblings are still live.
    #[derive(Debug)]
    pub(crate) struct TrackedResource {
        live: Rc<Cell<usize>>,
    }

    impl TrackedResource {
        pub(crate) fn new(live: &Rc<Cell<usize>>) -> Self {
            live.set(live.get() + 1);
            Self { live: live.clone() }
        }
    }

    impl GpuResource for TrackedResource {
        fn release(self) {
            self.live.set(self.live.get() - 1);
        }
    }

    #[test]
    fn test_release_single_material_object() {
        let live = Rc::new(Cell::new(0));
        let mut object = DrawableObject::new(
            "plane",
            TrackedResource::new(&live),
            Materials::Single(TrackedResource::new(&live)),
        );
        assert_eq!(live.get(), 2);
        assert_eq!(object.live_resources(), 2);

        let stats = object.release();
        assert_eq!(stats.geometries, 1);
        assert_eq!(stats.materials, 1);
        assert_eq!(stats.already_released, 0);
        assert_eq!(live.get(), 0);
        assert!(!object.is_live());
    }

    #[test]
    fn test_release_multi_material_object() {
        let live = Rc::new(Cell::new(0));
        let materials = (0..3).map(|_| TrackedResource::new(&live)).collect();
        let mut object =
            DrawableObject::new("model", TrackedResource::new(&live), Materials::Multi(materials));
        assert_eq!(object.live_resources(), 4);

        let stats = object.release();
        assert_eq!(stats.released(), 4);
        assert_eq!(stats.materials, 3);
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn test_second_release_is_a_no_op() {
        let live = Rc::new(Cell::new(0));
        let mut object = DrawableObject::new(
            "plane",
            TrackedResource::new(&live),
            Materials::Single(TrackedResource::new(&live)),
        );
        object.release();

        let stats = object.release();
        assert_eq!(stats.released(), 0);
        assert_eq!(stats.already_released, 2);
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn test_missing_parts_are_skipped() {
        let live = Rc::new(Cell::new(0));
        let mut no_geometry: DrawableObject<TrackedResource, TrackedResource> =
            DrawableObject::from_parts(
                "no geometry",
                None,
                Some(Materials::Single(TrackedResource::new(&live))),
            );
        let mut no_material: DrawableObject<TrackedResource, TrackedResource> =
            DrawableObject::from_parts("no material", Some(TrackedResource::new(&live)), None);

        let mut stats = no_geometry.release();
        stats += no_material.release();

        assert_eq!(stats.geometries, 1);
        assert_eq!(stats.materials, 1);
        assert_eq!(stats.already_released, 2);
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn test_material_lookup_per_group() {
        let single = Materials::Single("a");
        assert_eq!(single.get(0), Some(&"a"));
        assert_eq!(single.get(5), Some(&"a"));

        let multi = Materials::Multi(vec!["a", "b"]);
        assert_eq!(multi.get(1), Some(&"b"));
        assert_eq!(multi.get(7), Some(&"b"));

        let empty: Materials<&str> = Materials::Multi(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.get(0), None);
    }
}
