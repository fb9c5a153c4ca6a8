// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative field descriptors for units.
//!
//! Each unit publishes a static [`UnitDescriptor`] through
//! [`Describe::descriptor`](crate::units::Describe::descriptor): its name,
//! display metadata, and one [`FieldDescriptor`] per pin. Editors and
//! serializers build pin widgets and defaults from these tables. Unit
//! evaluation never consults them.

/// The value type of a pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// An element name.
    Name,
    /// A boolean.
    Bool,
    /// A scalar.
    Float,
    /// A planar vector.
    Vector2D,
    /// A 3D vector.
    Vector,
    /// An Euler rotation in degrees.
    Rotator,
    /// A quaternion.
    Quat,
    /// A full transform.
    Transform,
    /// A [`Space`](crate::units::Space) selector.
    Space,
    /// A [`ModifyBoneMode`](crate::units::ModifyBoneMode) selector.
    ModifyMode,
    /// A typed [`ControlValue`](crate::hierarchy::ControlValue).
    ControlValue,
    /// A list of bone name and transform pairs.
    BoneTargets,
}

impl FieldKind {
    /// Returns a stable lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Vector2D => "vector2d",
            Self::Vector => "vector",
            Self::Rotator => "rotator",
            Self::Quat => "quat",
            Self::Transform => "transform",
            Self::Space => "space",
            Self::ModifyMode => "modify_mode",
            Self::ControlValue => "control_value",
            Self::BoneTargets => "bone_targets",
        }
    }
}

/// Whether a pin is read or written by the unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PinDirection {
    /// Supplied by the graph.
    Input,
    /// Produced by the unit.
    Output,
}

impl PinDirection {
    /// Returns a stable lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Describes one pin of a unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldDescriptor {
    /// Pin name, as used in pin paths.
    pub name: &'static str,
    /// Value type.
    pub kind: FieldKind,
    /// Input or output.
    pub direction: PinDirection,
    /// Default value in display form.
    pub default: &'static str,
    /// Suggested editor slider range.
    pub ui_range: Option<(f64, f64)>,
    /// Whether the value is fixed at graph compile time.
    pub constant: bool,
}

impl FieldDescriptor {
    /// Creates an input pin descriptor.
    #[must_use]
    pub const fn input(name: &'static str, kind: FieldKind, default: &'static str) -> Self {
        Self {
            name,
            kind,
            direction: PinDirection::Input,
            default,
            ui_range: None,
            constant: false,
        }
    }

    /// Creates an output pin descriptor.
    #[must_use]
    pub const fn output(name: &'static str, kind: FieldKind, default: &'static str) -> Self {
        Self {
            name,
            kind,
            direction: PinDirection::Output,
            default,
            ui_range: None,
            constant: false,
        }
    }

    /// Marks the pin as constant.
    #[must_use]
    pub const fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    /// Sets the suggested slider range.
    #[must_use]
    pub const fn ui_range(mut self, min: f64, max: f64) -> Self {
        self.ui_range = Some((min, max));
        self
    }
}

/// Describes a unit type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitDescriptor {
    /// Type name, also used in trace events.
    pub name: &'static str,
    /// Name shown in the editor.
    pub display_name: &'static str,
    /// Editor menu category.
    pub category: &'static str,
    /// Search keywords.
    pub keywords: &'static [&'static str],
    /// Pins, in declaration order.
    pub fields: &'static [FieldDescriptor],
}

impl UnitDescriptor {
    /// Looks up a pin by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the input pins.
    pub fn inputs(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.direction == PinDirection::Input)
    }

    /// Returns the output pins.
    pub fn outputs(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.direction == PinDirection::Output)
    }
}
