use alloy_sol_types::sol;

sol! {
    interface ITodoList {
        function addTask(string memory content) external;

        function markTaskCompleted(uint256 taskId) external;

        function updateTask(uint256 taskId, string memory newContent, bool newCompleted) external;

        function deleteTask(uint256 taskId) external;

        function getAllTasks() external view returns (
            uint256[] memory ids,
            string[] memory contents,
            bool[] memory completed
        );

        function getTask(uint256 taskId) external view returns (string memory content, bool completed);

        function getTaskByContent(string memory content) external view returns (
            uint256 id,
            string memory taskContent,
            bool completed
        );
    }
}
