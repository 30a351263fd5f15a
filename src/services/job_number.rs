//! Sequential job number allocation
//!
//! Numbers start above `JOB_NUMBER_FLOOR` and only grow. Any number whose
//! 4th digit (from the left) is `0` falls in a reserved block and is
//! skipped by jumping ahead 100 until a usable number is found.

use crate::error::LedgerError;
use crate::types::{Job, JOB_NUMBER_FLOOR};

/// Block size skipped when a candidate lands in a reserved block
const RESERVED_SKIP: u32 = 100;

/// Whether the 4th decimal digit of `number` is zero
pub fn in_reserved_block(number: u32) -> bool {
    number.to_string().as_bytes().get(3) == Some(&b'0')
}

/// Allocator seeded from the current ledger maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobNumberAllocator {
    current: u32,
}

impl JobNumberAllocator {
    /// Start from `max(current)`, never below the floor
    pub fn starting_after(current: u32) -> Self {
        Self {
            current: current.max(JOB_NUMBER_FLOOR),
        }
    }

    pub fn from_jobs(jobs: &[Job]) -> Self {
        let max = jobs.iter().filter_map(|j| j.job_number).max().unwrap_or(JOB_NUMBER_FLOOR);
        Self::starting_after(max)
    }

    /// Hand out the next number. Fails once the `u32` range is used up.
    pub fn next_number(&mut self) -> Result<u32, LedgerError> {
        let exhausted = || LedgerError::JobNumbersExhausted(self.current);
        let mut candidate = self.current.checked_add(1).ok_or_else(exhausted)?;
        while in_reserved_block(candidate) {
            candidate = candidate.checked_add(RESERVED_SKIP).ok_or_else(exhausted)?;
        }
        self.current = candidate;
        Ok(candidate)
    }

    /// Last number handed out (or the seed)
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Assign numbers to jobs in slice order
    pub fn assign(&mut self, jobs: &mut [Job]) -> Result<(), LedgerError> {
        for job in jobs {
            job.job_number = Some(self.next_number()?);
        }
        Ok(())
    }
}
