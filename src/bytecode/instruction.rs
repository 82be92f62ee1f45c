//! Decoded instructions and their operands.

use serde::{Deserialize, Serialize};

use super::Opcode;

/// Identifier of a label pseudo-instruction within one method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub u32);

/// A referenced class member: owner, name and descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl MemberRef {
    /// Create a new member reference.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// Operand payload attached to an opcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// No operand.
    None,
    /// Local variable index.
    Var(u32),
    /// Local variable increment.
    Increment { var: u32, amount: i32 },
    /// Pushed constant value.
    Constant(i64),
    /// Single jump target.
    Target(LabelId),
    /// Multi-way branch targets plus default.
    Switch {
        targets: Vec<LabelId>,
        default: LabelId,
    },
    /// Referenced member (call or field access).
    Member(MemberRef),
    /// Source line number marker.
    Line(u32),
    /// Label definition.
    Marker(LabelId),
}

/// One decoded operation in a method body.
///
/// Immutable once decoded; owned exclusively by the stream that contains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    opcode: Opcode,
    payload: Payload,
}

impl Instruction {
    /// An operand-less instruction.
    pub fn simple(opcode: Opcode) -> Self {
        Self {
            opcode,
            payload: Payload::None,
        }
    }

    /// A local-variable load or store.
    pub fn var(opcode: Opcode, index: u32) -> Self {
        Self {
            opcode,
            payload: Payload::Var(index),
        }
    }

    /// An integer increment of a local variable.
    pub fn iinc(var: u32, amount: i32) -> Self {
        Self {
            opcode: Opcode::Iinc,
            payload: Payload::Increment { var, amount },
        }
    }

    /// A pushed integer constant.
    pub fn constant(value: i64) -> Self {
        Self {
            opcode: Opcode::Const,
            payload: Payload::Constant(value),
        }
    }

    /// A single-target jump.
    pub fn jump(opcode: Opcode, target: LabelId) -> Self {
        Self {
            opcode,
            payload: Payload::Target(target),
        }
    }

    /// A multi-way branch.
    pub fn switch(opcode: Opcode, targets: Vec<LabelId>, default: LabelId) -> Self {
        Self {
            opcode,
            payload: Payload::Switch { targets, default },
        }
    }

    /// A method call.
    pub fn invoke(
        opcode: Opcode,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            opcode,
            payload: Payload::Member(MemberRef::new(owner, name, descriptor)),
        }
    }

    /// A field access.
    pub fn field(
        opcode: Opcode,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            opcode,
            payload: Payload::Member(MemberRef::new(owner, name, descriptor)),
        }
    }

    /// A label definition.
    pub fn label(id: LabelId) -> Self {
        Self {
            opcode: Opcode::Label,
            payload: Payload::Marker(id),
        }
    }

    /// A source line number marker.
    pub fn line(line: u32) -> Self {
        Self {
            opcode: Opcode::LineNumber,
            payload: Payload::Line(line),
        }
    }

    /// A stack-map frame marker.
    pub fn frame() -> Self {
        Self {
            opcode: Opcode::Frame,
            payload: Payload::None,
        }
    }

    /// The opcode tag.
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// The operand payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Local variable index, for loads, stores and increments.
    pub fn local_var(&self) -> Option<u32> {
        match self.payload {
            Payload::Var(index) => Some(index),
            Payload::Increment { var, .. } => Some(var),
            _ => None,
        }
    }

    /// Increment amount, for `Iinc`.
    pub fn increment_amount(&self) -> Option<i32> {
        match self.payload {
            Payload::Increment { amount, .. } => Some(amount),
            _ => None,
        }
    }

    /// Pushed constant value.
    pub fn constant_value(&self) -> Option<i64> {
        match self.payload {
            Payload::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Single jump target.
    pub fn jump_target(&self) -> Option<LabelId> {
        match self.payload {
            Payload::Target(target) => Some(target),
            _ => None,
        }
    }

    /// The label this instruction defines.
    pub fn defined_label(&self) -> Option<LabelId> {
        match self.payload {
            Payload::Marker(id) => Some(id),
            _ => None,
        }
    }

    /// Source line number, for line markers.
    pub fn line_number(&self) -> Option<u32> {
        match self.payload {
            Payload::Line(line) => Some(line),
            _ => None,
        }
    }

    /// Referenced member, for calls and field accesses.
    pub fn member(&self) -> Option<&MemberRef> {
        match &self.payload {
            Payload::Member(member) => Some(member),
            _ => None,
        }
    }

    /// Whether this is a real, executable instruction rather than a label or
    /// debug marker.
    pub fn is_real(&self) -> bool {
        !self.opcode.is_synthetic()
    }

    /// Every label this instruction transfers control to.
    pub fn referenced_labels(&self) -> Vec<LabelId> {
        match &self.payload {
            Payload::Target(target) => vec![*target],
            Payload::Switch { targets, default } => {
                let mut labels = targets.clone();
                labels.push(*default);
                labels
            }
            _ => Vec::new(),
        }
    }
}
