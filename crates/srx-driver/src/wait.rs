//! 初始化沉降等待策略

use std::time::Duration;

/// 唤醒帧发出后的阻塞等待
pub trait SettleWait {
    fn wait(&self, duration: Duration);
}

/// 在调用线程上真实睡眠（默认）
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl SettleWait for ThreadSleep {
    fn wait(&self, duration: Duration) {
        spin_sleep::sleep(duration);
    }
}

/// 立即返回
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWait;

impl SettleWait for NoWait {
    fn wait(&self, _duration: Duration) {}
}
