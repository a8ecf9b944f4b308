//! # Grid snapshots
//!
//! The exporter never owns solver state. A [`GridSnapshot`] borrows the arrays it needs
//! for the duration of one export, and an [`Annotations`] list carries the sources and
//! receivers in the order their numeric tags are assigned.

use crate::prelude::*;

/// An entry of the material table
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Material {
    /// numeric ID stored in the `solid` and `ID` arrays
    pub num_id: u32,
    /// name written to the legend
    pub name: String,
}

/// A box of cells, `start` inclusive and `end` exclusive, in global cell indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor)]
pub struct CellBox {
    pub start: [usize; 3],
    pub end: [usize; 3],
}

impl CellBox {
    /// the part of this box that lies inside `[start, end)` per axis, if any
    pub(crate) fn intersect(&self, start: [usize; 3], end: [usize; 3]) -> Option<CellBox> {
        let mut out = CellBox::new([0; 3], [0; 3]);

        for a in 0..3 {
            out.start[a] = self.start[a].max(start[a]);
            out.end[a] = self.end[a].min(end[a]);

            if out.start[a] >= out.end[a] {
                return None;
            }
        }

        Some(out)
    }
}

/// Kinds of annotated points, declared in the order their tags are assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    Receiver,
    HertzianDipole,
    MagneticDipole,
    VoltageSource,
    TransmissionLine,
}

/// A named source or receiver at a single cell
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Annotation {
    pub kind: SourceKind,
    /// identifier written to the legend
    pub name: String,
    /// global cell coordinate
    pub position: [usize; 3],
}

/// The sources and receivers of a model, ordered for tagging.
///
/// Entries are ordered by [`SourceKind`] (receivers, Hertzian dipoles, magnetic
/// dipoles, voltage sources, transmission lines) and keep the order they were given
/// in within each kind. The `n`th entry is tagged `n + 2`: tag `0` is empty space and
/// tag `1` the absorbing boundary region.
///
/// ```
/// use geometry_view::{Annotation, Annotations, SourceKind};
///
/// let annotations = Annotations::new(vec![
///     Annotation::new(SourceKind::VoltageSource, "feed".into(), [1, 1, 1]),
///     Annotation::new(SourceKind::Receiver, "rx".into(), [2, 2, 2]),
/// ])
/// .unwrap();
///
/// let tags: Vec<_> = annotations.tagged().map(|(tag, a)| (tag, a.name.as_str())).collect();
/// assert_eq!(tags, vec![(2, "rx"), (3, "feed")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    /// first tag handed out to an annotation
    pub const FIRST_TAG: i8 = 2;

    /// largest number of annotations whose tags fit in an `Int8`
    pub const MAX: usize = (i8::MAX - Self::FIRST_TAG) as usize + 1;

    pub fn new(mut entries: Vec<Annotation>) -> Result<Self, Error> {
        if entries.len() > Self::MAX {
            return Err(Error::TooManyAnnotations {
                count: entries.len(),
                max: Self::MAX,
            });
        }

        // stable, so the order within a kind is kept
        entries.sort_by_key(|entry| entry.kind);

        Ok(Self(entries))
    }

    /// every annotation with its numeric tag, in tag order
    pub fn tagged(&self) -> impl Iterator<Item = (i8, &Annotation)> {
        self.0
            .iter()
            .enumerate()
            .map(|(index, entry)| (index as i8 + Self::FIRST_TAG, entry))
    }
}

/// A read-only view of the solver state at one point in time
///
/// `id` has shape `(3, nx + 1, ny + 1, nz + 1)` for a grid of `nx * ny * nz` cells:
/// `id[[axis, i, j, k]]` identifies the edge of direction `axis` leaving vertex
/// `(i, j, k)`. `solid` holds one material ID per cell and must cover at least
/// `(nx, ny, nz)`; solvers that allocate it with the vertex shape are accepted as is.
#[derive(Debug, Clone)]
pub struct GridSnapshot<'a> {
    cell_size: [f64; 3],
    solid: ArrayView3<'a, u32>,
    id: ArrayView4<'a, u32>,
    materials: &'a [Material],
    absorbing: &'a [CellBox],
}

impl<'a> GridSnapshot<'a> {
    pub fn new(
        cell_size: [f64; 3],
        solid: ArrayView3<'a, u32>,
        id: ArrayView4<'a, u32>,
    ) -> Result<Self, Error> {
        let (components, px, py, pz) = id.dim();

        if components != 3 || px == 0 || py == 0 || pz == 0 {
            return Err(Error::InvalidGrid(format!(
                "ID array has shape {:?}, expected (3, nx + 1, ny + 1, nz + 1)",
                id.shape()
            )));
        }

        let (sx, sy, sz) = solid.dim();

        if sx < px - 1 || sy < py - 1 || sz < pz - 1 {
            return Err(Error::InvalidGrid(format!(
                "solid array has shape {:?} but the grid has {} x {} x {} cells",
                solid.shape(),
                px - 1,
                py - 1,
                pz - 1
            )));
        }

        if let Some(size) = cell_size.iter().find(|size| !(size.is_finite() && **size > 0.0)) {
            return Err(Error::InvalidGrid(format!("cell size `{size}` must be positive")));
        }

        Ok(Self {
            cell_size,
            solid,
            id,
            materials: &[],
            absorbing: &[],
        })
    }

    /// attach the material table written to the legend
    pub fn with_materials(mut self, materials: &'a [Material]) -> Self {
        self.materials = materials;
        self
    }

    /// attach the boxes of the absorbing boundary region
    pub fn with_absorbing(mut self, absorbing: &'a [CellBox]) -> Self {
        self.absorbing = absorbing;
        self
    }

    /// number of cells along each axis
    pub fn cells(&self) -> [usize; 3] {
        let (_, px, py, pz) = self.id.dim();
        [px - 1, py - 1, pz - 1]
    }

    pub fn cell_size(&self) -> [f64; 3] {
        self.cell_size
    }

    pub fn materials(&self) -> &'a [Material] {
        self.materials
    }

    pub fn absorbing(&self) -> &'a [CellBox] {
        self.absorbing
    }

    /// material ID of cell `(i, j, k)`
    #[inline]
    pub fn solid(&self, i: usize, j: usize, k: usize) -> u32 {
        self.solid[[i, j, k]]
    }

    /// identifier of the `axis` directed edge leaving vertex `(i, j, k)`
    #[inline]
    pub fn edge_id(&self, axis: Axis, i: usize, j: usize, k: usize) -> u32 {
        self.id[[axis.index(), i, j, k]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rx(name: &str) -> Annotation {
        Annotation::new(SourceKind::Receiver, name.into(), [0; 3])
    }

    #[test]
    fn tags_follow_kind_order_then_insertion() {
        let annotations = Annotations::new(vec![
            Annotation::new(SourceKind::TransmissionLine, "tl".into(), [0; 3]),
            Annotation::new(SourceKind::MagneticDipole, "md".into(), [0; 3]),
            rx("rx1"),
            Annotation::new(SourceKind::HertzianDipole, "hd".into(), [0; 3]),
            Annotation::new(SourceKind::VoltageSource, "vs".into(), [0; 3]),
            rx("rx2"),
        ])
        .unwrap();

        let tagged: Vec<_> = annotations
            .tagged()
            .map(|(tag, entry)| (tag, entry.name.clone()))
            .collect();

        let expected: Vec<_> = ["rx1", "rx2", "hd", "md", "vs", "tl"]
            .iter()
            .enumerate()
            .map(|(i, name)| (i as i8 + 2, name.to_string()))
            .collect();

        assert_eq!(tagged, expected);
    }

    #[test]
    fn tag_capacity_is_enforced() {
        let fits: Vec<_> = (0..Annotations::MAX).map(|i| rx(&i.to_string())).collect();
        let annotations = Annotations::new(fits).unwrap();
        assert_eq!(annotations.tagged().last().map(|(tag, _)| tag), Some(i8::MAX));

        let too_many: Vec<_> = (0..=Annotations::MAX).map(|i| rx(&i.to_string())).collect();
        assert!(matches!(
            Annotations::new(too_many),
            Err(Error::TooManyAnnotations { count: 127, max: 126 })
        ));
    }

    #[test]
    fn box_intersection() {
        let b = CellBox::new([0, 0, 0], [4, 4, 4]);
        assert_eq!(
            b.intersect([2, 3, 1], [6, 6, 2]),
            Some(CellBox::new([2, 3, 1], [4, 4, 2]))
        );
        assert_eq!(b.intersect([4, 0, 0], [5, 4, 4]), None);
    }

    #[test]
    fn snapshot_shapes_are_checked() {
        let (solid, id) = crate::helpers::unique_arrays([2, 3, 4]);
        let grid = GridSnapshot::new([0.1; 3], solid.view(), id.view()).unwrap();
        assert_eq!(grid.cells(), [2, 3, 4]);
        assert_eq!(grid.edge_id(Axis::Y, 1, 2, 3), 1010203);
        assert_eq!(grid.solid(1, 2, 3), 10203);

        // vertex shaped solid arrays are fine
        let big_solid = Array3::<u32>::zeros((3, 4, 5));
        assert!(GridSnapshot::new([0.1; 3], big_solid.view(), id.view()).is_ok());

        let small_solid = Array3::<u32>::zeros((2, 2, 4));
        assert!(GridSnapshot::new([0.1; 3], small_solid.view(), id.view()).is_err());

        let bad_id = Array4::<u32>::zeros((2, 3, 4, 5));
        assert!(GridSnapshot::new([0.1; 3], solid.view(), bad_id.view()).is_err());

        assert!(GridSnapshot::new([0.1, 0.0, 0.1], solid.view(), id.view()).is_err());
    }
}
