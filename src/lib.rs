/// 像素坐标下的几何类型
pub mod geometry;

/// 像素格式、premultiplied ARGB 缓冲和 source-over 合成
pub mod pixel;

/// 各模块的错误类型
pub mod error;

/// 帧缓冲、窗口和可被包装的表面读操作
pub mod surface;

/// 帧缓冲更新管线的挂起开关与脏区域累积
pub mod pipeline;

/// 直接画进帧缓冲、可以无痕撤下的弹出层
pub mod screen_overlay;

/// 单个显示表面
pub mod screen;

/// 全部显示表面的注册表
pub mod display;

/// 演示程序的配置
pub mod config;

/// tracing 订阅者初始化
pub mod logging;

// 叠加层和推流共用同一块帧缓冲，叠加层自己没有合成层。
// 所以任何读帧缓冲或者搬移像素的操作都必须先看看叠加层在不在路上，
// 在的话先撤下来，读到的才是应用真正画的东西。
// 撤下来之后要不要放回去由调用方决定，比如倒计时每一跳都会重新 set_overlay。

// 多个表面可以同时有叠加层，每个表面的状态各管各的；
// 推流端只看汇总：有没有任何一个表面上画着叠加层。

// TODO: 目前只支持 32 位格式，Rgb565 表面上直接不提供叠加层；
// 要支持的话 compositor 需要一条按格式打包像素的路径
