// 路由模块
// 每个子模块包含自己的 handler 与数据结构

pub mod relay;
