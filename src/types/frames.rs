//! Coordinate frame markers and typed points
//!
//! This module provides type-safe points and vectors that cannot be
//! accidentally mixed across coordinate frames (global telescope frame
//! versus per-sensor local frame).

use std::marker::PhantomData;
use std::ops::{Add, Neg, Sub};

use nalgebra::Vector3;

// ============================================================================
// Frame Markers
// ============================================================================

/// Marker type for the global telescope frame (beam axis along z, millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalFrame;

/// Marker type for a sensor-local frame (origin at the plane center).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFrame;

// ============================================================================
// Typed Point
// ============================================================================

/// A 3D position bound to a coordinate frame.
///
/// The `Frame` parameter ensures that positions expressed in different
/// frames cannot be accidentally mixed in operations; conversions go
/// through the geometry context.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePoint<Frame> {
    inner: Vector3<f64>,
    _marker: PhantomData<Frame>,
}

/// A 3D displacement bound to a coordinate frame.
///
/// Unlike a [`FramePoint`], a displacement is unaffected by the translation
/// part of a frame change; the geometry context rotates it only.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameVector<Frame> {
    inner: Vector3<f64>,
    _marker: PhantomData<Frame>,
}

impl<Frame> FramePoint<Frame> {
    /// Creates a point from raw coordinates.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            inner: Vector3::new(x, y, z),
            _marker: PhantomData,
        }
    }

    /// Creates a point from an nalgebra vector.
    #[inline]
    pub fn from_vector3(inner: Vector3<f64>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the underlying nalgebra vector.
    #[inline]
    pub fn as_vector3(&self) -> &Vector3<f64> {
        &self.inner
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.inner.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.inner.y
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.inner.z
    }
}

impl<Frame> FrameVector<Frame> {
    /// Creates a displacement from raw components.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            inner: Vector3::new(x, y, z),
            _marker: PhantomData,
        }
    }

    /// Creates a displacement from an nalgebra vector.
    #[inline]
    pub fn from_vector3(inner: Vector3<f64>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the underlying nalgebra vector.
    #[inline]
    pub fn as_vector3(&self) -> &Vector3<f64> {
        &self.inner
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.inner.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.inner.y
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.inner.z
    }

    /// Euclidean length of the displacement.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.inner.norm()
    }
}

// ============================================================================
// Operations: point/vector arithmetic within one frame
// ============================================================================

impl<Frame> Sub for FramePoint<Frame> {
    type Output = FrameVector<Frame>;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        FrameVector {
            inner: self.inner - rhs.inner,
            _marker: PhantomData,
        }
    }
}

impl<Frame> Add<FrameVector<Frame>> for FramePoint<Frame> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: FrameVector<Frame>) -> Self::Output {
        Self {
            inner: self.inner + rhs.inner,
            _marker: PhantomData,
        }
    }
}

impl<Frame> Add for FrameVector<Frame> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            inner: self.inner + rhs.inner,
            _marker: PhantomData,
        }
    }
}

impl<Frame> Neg for FrameVector<Frame> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self {
            inner: -self.inner,
            _marker: PhantomData,
        }
    }
}

// ============================================================================
// Type Aliases
// ============================================================================

/// A position in the global telescope frame.
pub type GlobalPoint = FramePoint<GlobalFrame>;

/// A position in a sensor-local frame.
pub type LocalPoint = FramePoint<LocalFrame>;

/// A displacement in the global telescope frame.
pub type GlobalVector = FrameVector<GlobalFrame>;

/// A displacement in a sensor-local frame.
pub type LocalVector = FrameVector<LocalFrame>;
