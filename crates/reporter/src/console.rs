//! 리포터 출력 대상
//!
//! [`Console`]은 로그/경고/에러 세 단계의 출력 스트림입니다.
//! 기본 구현 [`StdConsole`]은 로그를 stdout으로, 경고와 에러를 stderr로 보냅니다.

use std::io::{self, Write};

/// 리포터가 쓰는 단계별 출력 스트림
pub trait Console: Send + Sync {
    fn log(&self, text: &str) -> io::Result<()>;
    fn warn(&self, text: &str) -> io::Result<()>;
    fn error(&self, text: &str) -> io::Result<()>;
}

/// 표준 출력/에러 콘솔
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn log(&self, text: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{text}")
    }

    fn warn(&self, text: &str) -> io::Result<()> {
        writeln!(io::stderr().lock(), "{text}")
    }

    fn error(&self, text: &str) -> io::Result<()> {
        writeln!(io::stderr().lock(), "{text}")
    }
}
