//! Surfaces the form services drive but do not render.

/// Severity of a toast notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastStatus {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub status: ToastStatus,
}

impl Toast {
    pub fn new(title: impl Into<String>, description: impl Into<String>, status: ToastStatus) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn show_toast(&self, toast: Toast);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);

    /// Installs or removes the prompt shown when the window is closed.
    fn set_unload_guard(&self, active: bool);

    /// Asks the user to confirm discarding unsaved changes.
    fn confirm_leave(&self) -> bool;
}

pub trait FieldFocus: Send + Sync {
    /// Scrolls to and focuses the input named `field`.
    fn focus_field(&self, field: &str);
}

/// Everything the business form needs from its host screen.
pub trait FormUi: Notifier + Navigator + FieldFocus {}

impl<T: Notifier + Navigator + FieldFocus> FormUi for T {}

#[cfg(any(test, feature = "test-mocks"))]
pub mod recording {
    //! UI double that records every call for assertions.

    use std::sync::Mutex;

    use super::{FieldFocus, Navigator, Notifier, Toast};

    #[derive(Debug, Default)]
    pub struct RecordingUi {
        pub toasts: Mutex<Vec<Toast>>,
        pub navigations: Mutex<Vec<String>>,
        pub guard_changes: Mutex<Vec<bool>>,
        pub focused: Mutex<Vec<String>>,
        pub decline_leave: Mutex<bool>,
    }

    impl RecordingUi {
        pub fn declining() -> Self {
            let ui = Self::default();
            *ui.decline_leave.lock().unwrap_or_else(|p| p.into_inner()) = true;
            ui
        }

        pub fn toasts(&self) -> Vec<Toast> {
            self.toasts.lock().unwrap_or_else(|p| p.into_inner()).clone()
        }

        pub fn navigations(&self) -> Vec<String> {
            self.navigations
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .clone()
        }

        /// Most recent guard state, `false` if never set.
        pub fn guard_active(&self) -> bool {
            self.guard_changes
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .last()
                .copied()
                .unwrap_or(false)
        }

        pub fn focused(&self) -> Vec<String> {
            self.focused.lock().unwrap_or_else(|p| p.into_inner()).clone()
        }
    }

    impl Notifier for RecordingUi {
        fn show_toast(&self, toast: Toast) {
            self.toasts
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push(toast);
        }
    }

    impl Navigator for RecordingUi {
        fn navigate(&self, path: &str) {
            self.navigations
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push(path.to_string());
        }

        fn set_unload_guard(&self, active: bool) {
            self.guard_changes
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push(active);
        }

        fn confirm_leave(&self) -> bool {
            !*self.decline_leave.lock().unwrap_or_else(|p| p.into_inner())
        }
    }

    impl FieldFocus for RecordingUi {
        fn focus_field(&self, field: &str) {
            self.focused
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push(field.to_string());
        }
    }
}
