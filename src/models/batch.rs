use crate::models::fragment::Fragment;

/// 一次合并调用的片段分组
///
/// 只在一次分发期间存在，按文档顺序连续切分，互不重叠。
#[derive(Debug, Clone)]
pub struct Batch {
    /// 批次序号（从 0 开始）
    pub index: usize,
    pub fragments: Vec<Fragment>,
}

impl Batch {
    /// 按 `batch_size` 把片段切成连续分组，`batch_size` 为 0 时按 1 处理
    pub fn split(fragments: &[Fragment], batch_size: usize) -> Vec<Batch> {
        fragments
            .chunks(batch_size.max(1))
            .enumerate()
            .map(|(index, chunk)| Batch {
                index,
                fragments: chunk.to_vec(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// 本批的条编号，用于日志
    pub fn numbers(&self) -> Vec<&str> {
        self.fragments.iter().map(|f| f.number.as_str()).collect()
    }
}
