// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Three-level control lifecycle.

/// Lifecycle state of a control.
///
/// A control is `Active` while it is attached (directly or through ancestors) to a host
/// control, and `Visible` while it is active and every visibility flag up to the host is set.
/// The only legal steps are `Inactive → Active → Visible → Active → Inactive`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewState {
    /// Detached from every host.
    #[default]
    Inactive,
    /// Attached to a host but not shown.
    Active,
    /// Attached and shown.
    Visible,
}

/// Why a view state change was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The pair of states is not one of the four legal steps.
    #[error("illegal view state change {from:?} -> {to:?}")]
    Illegal {
        /// Current state.
        from: ViewState,
        /// Requested state.
        to: ViewState,
    },
    /// The control is not attached to a host.
    #[error("control is not in a hierarchy rooted at a host")]
    NotInHierarchy,
    /// Becoming visible while a visibility flag on the way to the host is off.
    #[error("control is not visible on screen")]
    NotVisible,
}

impl ViewState {
    /// Check that `self → to` is one of the legal steps.
    ///
    /// ```
    /// use canopy_control::{TransitionError, ViewState};
    ///
    /// assert!(ViewState::Active.check_transition(ViewState::Visible).is_ok());
    /// assert_eq!(
    ///     ViewState::Inactive.check_transition(ViewState::Visible),
    ///     Err(TransitionError::Illegal {
    ///         from: ViewState::Inactive,
    ///         to: ViewState::Visible
    ///     })
    /// );
    /// ```
    pub fn check_transition(self, to: Self) -> Result<(), TransitionError> {
        match (self, to) {
            (Self::Inactive, Self::Active)
            | (Self::Active, Self::Visible)
            | (Self::Visible, Self::Active)
            | (Self::Active, Self::Inactive) => Ok(()),
            (from, to) => Err(TransitionError::Illegal { from, to }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_adjacent_steps_are_legal() {
        use ViewState::*;
        let all = [Inactive, Active, Visible];
        let legal = [
            (Inactive, Active),
            (Active, Visible),
            (Visible, Active),
            (Active, Inactive),
        ];
        for from in all {
            for to in all {
                assert_eq!(
                    from.check_transition(to).is_ok(),
                    legal.contains(&(from, to)),
                    "{from:?} -> {to:?}"
                );
            }
        }
    }

    #[test]
    fn states_are_ordered() {
        assert!(ViewState::Inactive < ViewState::Active);
        assert!(ViewState::Active < ViewState::Visible);
    }
}
