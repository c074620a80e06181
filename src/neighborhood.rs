//! Critical-path block neighborhood (Nowicki–Smutnicki).
//!
//! The critical path of a schedule is cut into blocks: maximal runs of at
//! least two consecutive operations on the same machine. Only swaps at the
//! boundary of a block can shorten the path, so each block yields at most
//! two moves: exchange its first two slots and, for blocks longer than two,
//! its last two slots.
//!
//! The critical path is read off the encoding's own machine rows, so every
//! block covers adjacent slots. Swapping two adjacent operations of a
//! critical block never creates a cycle, so every generated move decodes to
//! a feasible schedule, zero-length operations included.
//!
//! # Reference
//! Nowicki & Smutnicki (1996), "A Fast Taboo Search Algorithm for the Job
//! Shop Problem", Management Science 42(6)

use serde::{Deserialize, Serialize};

use crate::encoding::ResourceOrder;
use crate::error::Result;
use crate::models::{Schedule, Task};

/// A run of consecutive critical operations on one machine.
///
/// `first_slot..=last_slot` are slot indices in the machine's row of a
/// [`ResourceOrder`]. Blocks built by [`blocks`] always have
/// `first_slot < last_slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    /// Machine the block runs on.
    pub machine: usize,
    /// First slot of the block.
    pub first_slot: usize,
    /// Last slot of the block (inclusive).
    pub last_slot: usize,
}

/// Exchange of two slots in one machine's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Swap {
    /// Machine whose row is changed.
    pub machine: usize,
    /// First slot exchanged.
    pub slot1: usize,
    /// Second slot exchanged.
    pub slot2: usize,
}

impl Block {
    /// Number of operations in the block.
    #[inline]
    pub fn len(&self) -> usize {
        self.last_slot.saturating_sub(self.first_slot) + 1
    }

    /// Always false: a block holds at least two operations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Swap {
    /// Applies the swap in place.
    ///
    /// # Errors
    /// [`crate::JobShopError::InvalidEncoding`] if a slot is out of range.
    pub fn apply_on(&self, order: &mut ResourceOrder) -> Result<()> {
        order.swap(self.machine, self.slot1, self.slot2)
    }

    /// Decodes the schedule obtained by applying the swap to a copy of `order`.
    pub fn evaluate(&self, order: &ResourceOrder) -> Result<Schedule> {
        let mut candidate = order.clone();
        self.apply_on(&mut candidate)?;
        candidate.decode()
    }
}

/// Cuts a critical path into blocks of the given order.
///
/// A block is a maximal run of path operations on one machine that also
/// sit in consecutive slots of that machine's row. `critical_path` should
/// come from [`ResourceOrder::critical_path`] on the schedule `order`
/// decodes to.
pub fn blocks(order: &ResourceOrder, critical_path: &[Task]) -> Vec<Block> {
    let instance = order.instance();
    let slots = order.slot_table();
    let slot = |t: Task| slots[t.job][t.pos];
    let mut blocks = Vec::new();

    let mut i = 0;
    while i < critical_path.len() {
        let machine = instance.machine_of(critical_path[i]);
        let mut j = i;
        while j + 1 < critical_path.len()
            && instance.machine_of(critical_path[j + 1]) == machine
            && slot(critical_path[j + 1]) == slot(critical_path[j]) + 1
        {
            j += 1;
        }
        if j > i {
            blocks.push(Block {
                machine,
                first_slot: slot(critical_path[i]),
                last_slot: slot(critical_path[j]),
            });
        }
        i = j + 1;
    }

    blocks
}

/// Decodes `order` and returns the blocks of its critical path.
///
/// # Errors
/// [`crate::JobShopError::InvalidEncoding`] if `order` does not decode.
pub fn blocks_of_critical_path(order: &ResourceOrder) -> Result<Vec<Block>> {
    let schedule = order.decode()?;
    Ok(blocks(order, &order.critical_path(&schedule)))
}

/// Boundary swaps of a block: the first two slots, and the last two when
/// the block is longer than two.
pub fn neighbors(block: &Block) -> Vec<Swap> {
    let mut swaps = vec![Swap {
        machine: block.machine,
        slot1: block.first_slot,
        slot2: block.first_slot + 1,
    }];
    if block.len() > 2 {
        swaps.push(Swap {
            machine: block.machine,
            slot1: block.last_slot - 1,
            slot2: block.last_slot,
        });
    }
    swaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::JobSequence;
    use crate::models::Instance;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    // Three jobs that all start on m0 and then visit m1
    fn instance() -> Arc<Instance> {
        Arc::new(
            Instance::new(
                vec![vec![0, 1], vec![0, 1], vec![0, 1]],
                vec![vec![2, 1], vec![3, 1], vec![4, 1]],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_neighbors_of_blocks() {
        let short = Block {
            machine: 0,
            first_slot: 2,
            last_slot: 3,
        };
        assert_eq!(short.len(), 2);
        assert_eq!(
            neighbors(&short),
            vec![Swap {
                machine: 0,
                slot1: 2,
                slot2: 3
            }]
        );

        let long = Block {
            machine: 1,
            first_slot: 0,
            last_slot: 3,
        };
        let swaps = neighbors(&long);
        assert_eq!(swaps.len(), 2);
        assert_eq!((swaps[0].slot1, swaps[0].slot2), (0, 1));
        assert_eq!((swaps[1].slot1, swaps[1].slot2), (2, 3));
    }

    #[test]
    fn test_blocks_of_flow_shop() {
        // m0: J0 [0,2) J1 [2,5) J2 [5,9); J2 then m1 [9,10)
        let order = JobSequence::from_jobs(instance(), vec![0, 1, 2, 0, 1, 2])
            .decode()
            .map(|s| ResourceOrder::from_schedule(&s))
            .unwrap();
        let blocks = blocks_of_critical_path(&order).unwrap();
        assert_eq!(
            blocks,
            vec![Block {
                machine: 0,
                first_slot: 0,
                last_slot: 2
            }]
        );
    }

    #[test]
    fn test_blocks_with_zero_length_ties() {
        // J0: m0(0) → m1(1); J1: m0(0) → m1(5); J1 first on both machines
        let inst = Arc::new(
            Instance::new(vec![vec![0, 1], vec![0, 1]], vec![vec![0, 1], vec![0, 5]]).unwrap(),
        );
        let order = ResourceOrder::from_machine_orders(
            inst,
            vec![
                vec![Task::new(1, 0), Task::new(0, 0)],
                vec![Task::new(1, 1), Task::new(0, 1)],
            ],
        );
        let blocks = blocks_of_critical_path(&order).unwrap();
        assert_eq!(
            blocks,
            vec![Block {
                machine: 1,
                first_slot: 0,
                last_slot: 1
            }]
        );
        assert!(blocks.iter().all(|b| b.first_slot < b.last_slot));
    }

    #[test]
    fn test_blocks_skip_non_adjacent_slots() {
        // Path tasks of one machine that are not neighbours in the row
        let order = JobSequence::from_jobs(instance(), vec![0, 1, 2, 0, 1, 2])
            .decode()
            .map(|s| ResourceOrder::from_schedule(&s))
            .unwrap();
        let path = [Task::new(2, 0), Task::new(0, 0)];
        assert!(blocks(&order, &path).is_empty());

        let reversed = Block {
            machine: 0,
            first_slot: 2,
            last_slot: 0,
        };
        assert_eq!(reversed.len(), 1);
    }

    #[test]
    fn test_single_job_path_has_no_blocks() {
        let inst = Arc::new(Instance::new(vec![vec![0, 1]], vec![vec![2, 3]]).unwrap());
        let order = ResourceOrder::from_schedule(
            &JobSequence::from_jobs(Arc::clone(&inst), vec![0, 0]).decode().unwrap(),
        );
        assert!(blocks_of_critical_path(&order).unwrap().is_empty());
    }

    #[test]
    fn test_swap_evaluate_leaves_original() {
        let s = JobSequence::from_jobs(instance(), vec![0, 1, 2, 0, 1, 2]).decode().unwrap();
        let order = ResourceOrder::from_schedule(&s);
        let swap = Swap {
            machine: 0,
            slot1: 1,
            slot2: 2,
        };
        let swapped = swap.evaluate(&order).unwrap();
        // m0: J0 [0,2) J2 [2,6) J1 [6,9)
        assert_eq!(swapped.start_time(Task::new(2, 0)), 2);
        assert_eq!(order.decode().unwrap(), s);

        let bad = Swap {
            machine: 0,
            slot1: 1,
            slot2: 7,
        };
        assert!(bad.evaluate(&order).is_err());
    }

    fn assert_block_swaps_decode(order: &ResourceOrder) {
        for block in blocks_of_critical_path(order).unwrap() {
            assert!(block.first_slot < block.last_slot);
            for swap in neighbors(&block) {
                assert!(swap.evaluate(order).is_ok(), "{swap:?} on\n{order}");
            }
        }
    }

    #[test]
    fn test_block_swaps_always_decode() {
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..10 {
            let inst = Arc::new(Instance::random(6, 4, 20, &mut rng));
            let s = JobSequence::random(Arc::clone(&inst), &mut rng).decode().unwrap();
            assert_block_swaps_decode(&ResourceOrder::from_schedule(&s));
        }
    }

    #[test]
    fn test_block_swaps_decode_with_zero_lengths() {
        let mut rng = SmallRng::seed_from_u64(101);
        for _ in 0..30 {
            let inst = Arc::new(Instance::random_with_durations(6, 4, 0..=2, &mut rng));
            let mut order =
                ResourceOrder::from_schedule(&JobSequence::random(inst, &mut rng).decode().unwrap());
            // Walk a few swaps so rows drift away from the canonical order
            for _ in 0..5 {
                assert_block_swaps_decode(&order);
                let Some(swap) = blocks_of_critical_path(&order)
                    .unwrap()
                    .first()
                    .map(|b| neighbors(b)[0])
                else {
                    break;
                };
                swap.apply_on(&mut order).unwrap();
            }
        }
    }
}
