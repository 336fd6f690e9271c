use crate::error::AssemblyError;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// 协作式取消标记
///
/// 只影响尚未派发的页面，已经在途的请求自然结束或超时
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn check_cancelled(&self, stage: &'static str) -> Result<(), AssemblyError> {
        if self.is_cancelled() {
            return Err(AssemblyError::Cancelled { stage });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(token.check_cancelled("start").is_ok());

        other.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            token.check_cancelled("start"),
            Err(AssemblyError::Cancelled { stage: "start" })
        ));
    }
}
