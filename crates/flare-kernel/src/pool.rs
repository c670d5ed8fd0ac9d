//! Fixed-capacity instance pool.
//!
//! Every slot lives at a fixed index in a set of parallel attribute groups.
//! Each group is a contiguous `#[repr(C)]` Pod buffer that the render backend
//! uploads as a per-instance vertex attribute. Groups carry their own dirty
//! flag; the pool sets it whenever slots are (re)populated and the consumer
//! clears it after uploading.
//!
//! Slots are never removed. A slot whose lifetime has elapsed is parked by
//! the kinematic evaluator until the scheduler overwrites it.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use tracing::debug;

/// Transform group: base position, normalized rotation and scale (7 floats).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    /// Spawn position
    pub position: [f32; 3],
    /// Initial rotation, normalized -1..1
    pub rotation: [f32; 3],
    /// Base scale
    pub scale: f32,
}

/// Lifetime group: birth time and lifetime in seconds.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceLifetime {
    /// Clock time at which the slot was populated
    pub spawn_time: f32,
    /// Lifetime in seconds
    pub duration: f32,
}

/// Alpha-map group: atlas cell indices for the start and end of life.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct AlphaMapOffset {
    /// Start-of-life atlas cell
    pub start: f32,
    /// End-of-life atlas cell
    pub end: f32,
}

/// CPU view of one slot, assembled from every attribute group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParticleSlot {
    /// Spawn position
    pub base_position: Vec3,
    /// Initial rotation, normalized -1..1
    pub base_rotation: Vec3,
    /// Base scale
    pub base_scale: f32,
    /// Emission direction
    pub direction: Vec3,
    /// Rotation speed in radians per second
    pub rotation_speed: Vec3,
    /// Clock time at spawn
    pub spawn_time: f32,
    /// Lifetime in seconds
    pub duration: f32,
    /// Start-of-life alpha-map index
    pub alpha_map_start: u32,
    /// End-of-life alpha-map index
    pub alpha_map_end: u32,
    /// Speed; negative reverses the age computation
    pub speed: f32,
    /// Gradient row drawn at spawn
    pub gradient_row: u32,
}

/// A contiguous per-instance attribute buffer with a dirty flag.
#[derive(Debug, Clone)]
pub struct AttributeBuffer<T: Pod> {
    name: &'static str,
    data: Vec<T>,
    dirty: bool,
}

impl<T: Pod> AttributeBuffer<T> {
    /// Creates a zeroed buffer with `len` elements. New buffers start dirty.
    #[must_use]
    pub fn new(name: &'static str, len: usize) -> Self {
        Self {
            name,
            data: vec![T::zeroed(); len],
            dirty: true,
        }
    }

    /// Attribute name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes per element.
    #[must_use]
    pub const fn stride(&self) -> usize {
        std::mem::size_of::<T>()
    }

    /// Reads one element.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.data.get(index).copied()
    }

    /// Writes one element without touching the dirty flag.
    pub fn set(&mut self, index: usize, value: T) {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = value;
        }
    }

    /// Overwrites every element and marks the buffer dirty.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
        self.dirty = true;
    }

    /// Element slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Raw bytes for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Flags the buffer for upload.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the buffer changed since the last upload.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty flag and clears it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn release(&mut self) {
        self.data = Vec::new();
        self.dirty = false;
    }
}

/// Borrowed view of one attribute group, for upload.
#[derive(Debug, Clone, Copy)]
pub struct AttributeView<'a> {
    /// Attribute name
    pub name: &'static str,
    /// Bytes per instance
    pub stride: usize,
    /// Buffer contents
    pub bytes: &'a [u8],
    /// Whether the group changed since the last upload
    pub dirty: bool,
}

impl<'a, T: Pod> From<&'a AttributeBuffer<T>> for AttributeView<'a> {
    fn from(buffer: &'a AttributeBuffer<T>) -> Self {
        Self {
            name: buffer.name(),
            stride: buffer.stride(),
            bytes: buffer.as_bytes(),
            dirty: buffer.is_dirty(),
        }
    }
}

/// Fixed-capacity pool of particle slots.
#[derive(Debug, Clone)]
pub struct InstancePool {
    capacity: u32,
    transforms: AttributeBuffer<InstanceTransform>,
    directions: AttributeBuffer<[f32; 3]>,
    rotation_speeds: AttributeBuffer<[f32; 3]>,
    lifetimes: AttributeBuffer<InstanceLifetime>,
    alpha_maps: AttributeBuffer<AlphaMapOffset>,
    speeds: AttributeBuffer<f32>,
    gradient_rows: AttributeBuffer<f32>,
}

impl InstancePool {
    /// Creates a pool with `capacity` zeroed slots.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        let len = capacity as usize;
        debug!("Allocating instance pool with {} slots", capacity);
        Self {
            capacity,
            transforms: AttributeBuffer::new("instanceTransform", len),
            directions: AttributeBuffer::new("instanceDirection", len),
            rotation_speeds: AttributeBuffer::new("instanceRotationSpeed", len),
            lifetimes: AttributeBuffer::new("instanceLifetime", len),
            alpha_maps: AttributeBuffer::new("instanceAlphaMapOffset", len),
            speeds: AttributeBuffer::new("instanceSpeed", len),
            gradient_rows: AttributeBuffer::new("instanceGradientRow", len),
        }
    }

    /// Slot count fixed at construction.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of slots currently backed by buffers (0 after release).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lifetimes.len()
    }

    /// Whether no slots are backed by buffers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lifetimes.is_empty()
    }

    /// Assembles the slot at `index`.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<ParticleSlot> {
        let transform = self.transforms.get(index)?;
        let lifetime = self.lifetimes.get(index)?;
        let alpha = self.alpha_maps.get(index)?;
        Some(ParticleSlot {
            base_position: Vec3::from(transform.position),
            base_rotation: Vec3::from(transform.rotation),
            base_scale: transform.scale,
            direction: Vec3::from(self.directions.get(index)?),
            rotation_speed: Vec3::from(self.rotation_speeds.get(index)?),
            spawn_time: lifetime.spawn_time,
            duration: lifetime.duration,
            alpha_map_start: alpha.start as u32,
            alpha_map_end: alpha.end as u32,
            speed: self.speeds.get(index)?,
            gradient_row: self.gradient_rows.get(index)? as u32,
        })
    }

    /// Writes a slot into every attribute group. Dirty flags are left to the
    /// caller, which marks them once per frame.
    pub fn write_slot(&mut self, index: usize, slot: &ParticleSlot) {
        self.transforms.set(
            index,
            InstanceTransform {
                position: slot.base_position.to_array(),
                rotation: slot.base_rotation.to_array(),
                scale: slot.base_scale,
            },
        );
        self.directions.set(index, slot.direction.to_array());
        self.rotation_speeds.set(index, slot.rotation_speed.to_array());
        self.lifetimes.set(
            index,
            InstanceLifetime {
                spawn_time: slot.spawn_time,
                duration: slot.duration,
            },
        );
        self.alpha_maps.set(
            index,
            AlphaMapOffset {
                start: slot.alpha_map_start as f32,
                end: slot.alpha_map_end as f32,
            },
        );
        self.speeds.set(index, slot.speed);
        self.gradient_rows.set(index, slot.gradient_row as f32);
    }

    /// Zeroes every lifetime so that all slots evaluate as parked.
    pub fn clear_lifetimes(&mut self) {
        self.lifetimes.fill(InstanceLifetime::default());
    }

    /// Flags every attribute group for upload.
    pub fn mark_all_dirty(&mut self) {
        self.transforms.mark_dirty();
        self.directions.mark_dirty();
        self.rotation_speeds.mark_dirty();
        self.lifetimes.mark_dirty();
        self.alpha_maps.mark_dirty();
        self.speeds.mark_dirty();
        self.gradient_rows.mark_dirty();
    }

    /// Whether any attribute group awaits upload.
    #[must_use]
    pub fn any_dirty(&self) -> bool {
        self.attributes().iter().any(|view| view.dirty)
    }

    /// Views of every attribute group, in binding order.
    #[must_use]
    pub fn attributes(&self) -> [AttributeView<'_>; 7] {
        [
            (&self.transforms).into(),
            (&self.directions).into(),
            (&self.rotation_speeds).into(),
            (&self.lifetimes).into(),
            (&self.alpha_maps).into(),
            (&self.speeds).into(),
            (&self.gradient_rows).into(),
        ]
    }

    /// Clears every dirty flag, returning how many groups were dirty.
    pub fn take_dirty(&mut self) -> usize {
        [
            self.transforms.take_dirty(),
            self.directions.take_dirty(),
            self.rotation_speeds.take_dirty(),
            self.lifetimes.take_dirty(),
            self.alpha_maps.take_dirty(),
            self.speeds.take_dirty(),
            self.gradient_rows.take_dirty(),
        ]
        .into_iter()
        .filter(|dirty| *dirty)
        .count()
    }

    /// Lifetime group.
    #[must_use]
    pub const fn lifetimes(&self) -> &AttributeBuffer<InstanceLifetime> {
        &self.lifetimes
    }

    /// Transform group.
    #[must_use]
    pub const fn transforms(&self) -> &AttributeBuffer<InstanceTransform> {
        &self.transforms
    }

    /// Frees every buffer. The capacity is kept for reporting.
    pub fn release(&mut self) {
        self.transforms.release();
        self.directions.release();
        self.rotation_speeds.release();
        self.lifetimes.release();
        self.alpha_maps.release();
        self.speeds.release();
        self.gradient_rows.release();
        debug!("Released instance pool ({} slots)", self.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_slot() -> ParticleSlot {
        ParticleSlot {
            base_position: Vec3::new(1.0, 2.0, 3.0),
            base_rotation: Vec3::new(-0.5, 0.0, 0.5),
            base_scale: 0.75,
            direction: Vec3::Y,
            rotation_speed: Vec3::new(0.0, 0.0, 2.0),
            spawn_time: 1.5,
            duration: 2.0,
            alpha_map_start: 1,
            alpha_map_end: 3,
            speed: -4.0,
            gradient_row: 2,
        }
    }

    #[test]
    fn test_pod_layouts() {
        assert_eq!(std::mem::size_of::<InstanceTransform>(), 7 * 4);
        assert_eq!(std::mem::size_of::<InstanceLifetime>(), 2 * 4);
        assert_eq!(std::mem::size_of::<AlphaMapOffset>(), 2 * 4);
    }

    #[test]
    fn test_new_pool_is_zeroed_and_dirty() {
        let pool = InstancePool::new(16);
        assert_eq!(pool.capacity(), 16);
        assert_eq!(pool.len(), 16);
        assert!(pool.any_dirty());

        let slot = pool.slot(3).expect("slot in range");
        assert_eq!(slot.duration, 0.0);
        assert_eq!(slot.base_position, Vec3::ZERO);
        assert!(pool.slot(16).is_none());
    }

    #[test]
    fn test_write_and_read_slot() {
        let mut pool = InstancePool::new(4);
        pool.take_dirty();

        pool.write_slot(2, &sample_slot());
        assert_eq!(pool.slot(2), Some(sample_slot()));
        assert!(!pool.any_dirty(), "writes leave dirty marking to the caller");

        pool.mark_all_dirty();
        assert_eq!(pool.take_dirty(), 7);
        assert!(!pool.any_dirty());
    }

    #[test]
    fn test_clear_lifetimes() {
        let mut pool = InstancePool::new(4);
        pool.write_slot(0, &sample_slot());
        pool.take_dirty();

        pool.clear_lifetimes();
        let slot = pool.slot(0).expect("slot in range");
        assert_eq!(slot.spawn_time, 0.0);
        assert_eq!(slot.duration, 0.0);
        assert_eq!(slot.speed, -4.0);
        assert!(pool.lifetimes().is_dirty());
        assert!(!pool.transforms().is_dirty());
    }

    #[test]
    fn test_attribute_bytes() {
        let mut pool = InstancePool::new(3);
        pool.write_slot(1, &sample_slot());

        let views = pool.attributes();
        assert_eq!(views[0].name, "instanceTransform");
        assert_eq!(views[0].stride, 28);
        assert_eq!(views[0].bytes.len(), 3 * 28);

        let lifetimes: &[InstanceLifetime] = bytemuck::cast_slice(views[3].bytes);
        assert_eq!(lifetimes[1].spawn_time, 1.5);
    }

    #[test]
    fn test_release() {
        let mut pool = InstancePool::new(8);
        pool.release();
        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), 8);
        assert!(pool.slot(0).is_none());
        assert!(!pool.any_dirty());
    }
}
